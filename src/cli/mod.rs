//! CLI module for LossCut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// LossCut
///
/// Lossless, keyframe-accurate cutting, merging, and stream extraction
/// driven through an external ffmpeg/ffprobe pair.
#[derive(Parser)]
#[command(name = "losscut")]
#[command(about = "Lossless video cutting and merging without re-encoding")]
#[command(version)]
pub struct Cli {
    /// Directory holding the engine binaries in per-OS subdirectories
    #[arg(long, env = "LOSSCUT_TOOL_DIR", global = true)]
    pub tool_dir: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Cut one or more segments out of a file by stream copy
    Cut(args::CutArgs),
    /// Merge files of identical layout into one, losslessly
    Merge(args::MergeArgs),
    /// Extract every stream into its own container
    Extract(args::ExtractArgs),
    /// Print container, stream, and frame metadata
    Probe(args::ProbeArgs),
}

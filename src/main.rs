//! LossCut
//!
//! Lossless, keyframe-accurate video cutting and merging driven through an
//! external ffmpeg/ffprobe pair.
//!
//! # Usage
//!
//! ```bash
//! losscut cut -i video.mp4 --from 00:01:00 --to 00:02:00
//! losscut merge part1.mp4 part2.mp4 --auto-delete
//! losscut extract -i video.mkv
//! losscut probe -i video.mp4 --frames
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use losscut::cli::{commands, Cli, Commands};
use losscut::config::Config;

/// Main entry point for the LossCut CLI
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Cut(args) => commands::cut(args, cli.tool_dir, &config).await,
        Commands::Merge(args) => commands::merge(args, cli.tool_dir, &config).await,
        Commands::Extract(args) => commands::extract(args, cli.tool_dir, &config).await,
        Commands::Probe(args) => commands::probe(args, cli.tool_dir, &config).await,
    }
}

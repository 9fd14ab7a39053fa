//! Error handling module for LossCut

use thiserror::Error;

/// Main error type for LossCut operations
#[derive(Error, Debug)]
pub enum LossCutError {
    /// Host platform has no known engine binary layout
    #[error("Unsupported host platform: {platform}")]
    Configuration { platform: String },

    /// External engine process exited with a failure
    #[error("{binary} exited with status {status}: {stderr}")]
    Process {
        binary: String,
        status: i32,
        stderr: String,
    },

    /// Probe output could not be interpreted
    #[error("Failed to probe media file: {message}")]
    Probe { message: String },

    /// Too few frames in the probed window to resolve a boundary
    #[error("Not enough frames around {cut_time}s to resolve a cut boundary")]
    InsufficientFrames { cut_time: f64 },

    /// No keyframe exists at or after the requested cut point
    #[error("No keyframe found at or after {cut_time}s")]
    NoKeyframeFound { cut_time: f64 },

    /// The requested cut point resolves to the final frame
    #[error("Cut point {cut_time}s lands on the last frame; cannot cut forward from it")]
    TerminalFrame { cut_time: f64 },

    /// No frame exists at or before the requested cut point
    #[error("No frame found at or before {cut_time}s")]
    NoPriorFrame { cut_time: f64 },

    /// The requested cut point resolves to the first frame
    #[error("Cut point {cut_time}s lands on the first frame; cannot cut before it")]
    FirstFrame { cut_time: f64 },

    /// Inverted or empty cut range
    #[error("Invalid cut range: start ({from}) must be less than end ({to})")]
    InvalidCutRange { from: f64, to: f64 },

    /// Every stream selection for the operation was empty
    #[error("No streams selected for the operation")]
    EmptySelection,

    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS.ms, MM:SS.ms, or seconds")]
    InvalidTimeFormat { time: String },

    /// Configuration file could not be read or parsed
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for LossCut operations
pub type LossCutResult<T> = std::result::Result<T, LossCutError>;

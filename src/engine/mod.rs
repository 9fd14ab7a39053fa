//! External engine invocation and progress tracking

pub mod progress;
pub mod runner;

pub use runner::{BinaryKind, EngineOutput, ProcessRunner};

/// Fractional progress sink shared by an operation, values in `[0, 1]`
pub type ProgressSink = std::sync::Arc<dyn Fn(f64) + Send + Sync>;

/// Sink that drops every update
pub fn null_progress() -> ProgressSink {
    std::sync::Arc::new(|_| {})
}

//! Collaborator seams for host-owned side effects
//!
//! Trash handling and timestamp transfer belong to the embedding
//! application; they are injected here as capabilities so the coordinator
//! can drive them without owning their policy. The provided filesystem
//! implementations are deliberately thin.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

/// Sink receiving each fully rendered engine command line before it runs
pub trait CommandLog: Send + Sync {
    fn log_command(&self, line: &str);
}

/// Default command log backed by the diagnostic log
pub struct TracingCommandLog;

impl CommandLog for TracingCommandLog {
    fn log_command(&self, line: &str) {
        debug!(target: "losscut::command", "{}", line);
    }
}

/// Carries a source file's timestamps onto a produced output
#[async_trait]
pub trait TimestampCarrier: Send + Sync {
    async fn transfer(&self, source: &Path, output: &Path) -> std::io::Result<()>;
}

/// Copies the source's modification time onto the output file
pub struct FsTimestampCarrier;

#[async_trait]
impl TimestampCarrier for FsTimestampCarrier {
    async fn transfer(&self, source: &Path, output: &Path) -> std::io::Result<()> {
        let source: PathBuf = source.to_path_buf();
        let output: PathBuf = output.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let modified = std::fs::metadata(&source)?.modified()?;
            let file = std::fs::OpenOptions::new().write(true).open(&output)?;
            file.set_times(std::fs::FileTimes::new().set_modified(modified))
        })
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?
    }
}

/// Disposes of a consumed file after an auto-merge
#[async_trait]
pub trait TrashSink: Send + Sync {
    async fn discard(&self, path: &Path) -> std::io::Result<()>;
}

/// Plain deletion; a host application would substitute its trash bin here
pub struct FsTrashSink;

#[async_trait]
impl TrashSink for FsTrashSink {
    async fn discard(&self, path: &Path) -> std::io::Result<()> {
        tokio::fs::remove_file(path).await
    }
}

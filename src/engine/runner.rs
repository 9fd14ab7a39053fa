//! Probe and transcode process invocation

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::engine::progress::feed_progress;
use crate::engine::ProgressSink;
use crate::error::{LossCutError, LossCutResult};
use crate::ports::CommandLog;

/// Which engine binary an invocation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryKind {
    /// Read-only metadata inspection
    Probe,
    /// Muxing/trimming work
    Transcode,
}

impl BinaryKind {
    fn base_name(self) -> &'static str {
        match self {
            BinaryKind::Probe => "ffprobe",
            BinaryKind::Transcode => "ffmpeg",
        }
    }
}

/// Captured output of a successful engine invocation
#[derive(Debug)]
pub struct EngineOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Invokes the external engine binaries and captures their output
///
/// One call is one process; there are no retries here. Callers decide
/// whether a failed invocation is worth repeating.
pub struct ProcessRunner {
    tool_dir: Option<PathBuf>,
    command_log: Arc<dyn CommandLog>,
}

impl ProcessRunner {
    pub fn new(tool_dir: Option<PathBuf>, command_log: Arc<dyn CommandLog>) -> Self {
        Self {
            tool_dir,
            command_log,
        }
    }

    /// Resolve the executable path for one binary on this host
    ///
    /// With a tool directory configured, binaries live in a per-OS
    /// subdirectory; otherwise the bare name is resolved through `PATH`.
    fn binary_path(&self, kind: BinaryKind) -> LossCutResult<PathBuf> {
        let (subdir, suffix) = match std::env::consts::OS {
            "linux" => ("linux", ""),
            "macos" => ("darwin", ""),
            "windows" => ("win32", ".exe"),
            other => {
                return Err(LossCutError::Configuration {
                    platform: other.to_string(),
                })
            }
        };
        let file_name = format!("{}{}", kind.base_name(), suffix);
        Ok(match &self.tool_dir {
            Some(dir) => dir.join(subdir).join(file_name),
            None => PathBuf::from(file_name),
        })
    }

    /// Run one engine invocation to completion, capturing its output
    pub async fn run(&self, kind: BinaryKind, args: &[String]) -> LossCutResult<EngineOutput> {
        let program = self.binary_path(kind)?;
        self.command_log.log_command(&render_command(&program, args));

        let output = Command::new(&program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await?;

        if !output.status.success() {
            return Err(LossCutError::Process {
                binary: kind.base_name().to_string(),
                status: output.status.code().unwrap_or(-1),
                stderr: stderr_excerpt(&output.stderr),
            });
        }

        Ok(EngineOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Spawn a transcode and stream its status lines into a progress sink
    ///
    /// `stdin_payload` feeds process stdin when given (concat listings);
    /// progress reporting is best-effort and never fails the invocation.
    pub async fn run_transcode_streaming(
        &self,
        args: &[String],
        stdin_payload: Option<Vec<u8>>,
        segment_duration: f64,
        progress: &ProgressSink,
    ) -> LossCutResult<()> {
        let program = self.binary_path(BinaryKind::Transcode)?;
        self.command_log.log_command(&render_command(&program, args));

        let mut child = Command::new(&program)
            .args(args)
            .stdin(if stdin_payload.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            // Dropping an in-flight cut terminates the engine; the partial
            // output is left behind as a recoverable abort.
            .kill_on_drop(true)
            .spawn()?;

        if let (Some(payload), Some(mut stdin)) = (stdin_payload, child.stdin.take()) {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await?;
            drop(stdin);
        }

        let stderr_tail = match child.stderr.take() {
            Some(stderr) => feed_progress(stderr, segment_duration, progress).await,
            None => {
                warn!("transcode stderr was not captured; progress unavailable");
                String::new()
            }
        };

        let status = child.wait().await?;
        if !status.success() {
            return Err(LossCutError::Process {
                binary: BinaryKind::Transcode.base_name().to_string(),
                status: status.code().unwrap_or(-1),
                stderr: stderr_tail,
            });
        }

        debug!("transcode finished: {}", args.join(" "));
        Ok(())
    }
}

/// Shell-quoted rendering of an invocation for the diagnostic log
pub fn render_command(program: &Path, args: &[String]) -> String {
    std::iter::once(program.display().to_string())
        .chain(args.iter().cloned())
        .map(|arg| quote_arg(&arg))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Single-quote any argument containing characters outside `[0-9A-Za-z_-]`
fn quote_arg(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

fn stderr_excerpt(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().rev().take(8).collect();
    lines.into_iter().rev().collect::<Vec<_>>().join("\n")
}

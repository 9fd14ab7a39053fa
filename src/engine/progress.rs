//! Progress extraction from the transcode engine's status stream
//!
//! ffmpeg reports periodic `time=HH:MM:SS.cs` status lines on stderr while
//! it runs. Parsing them is best-effort: a line that does not match is
//! skipped, and no parse failure may ever abort the transcode itself.

use std::sync::OnceLock;

use regex::Regex;
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::trace;

use crate::engine::ProgressSink;

/// Lines of stderr retained for error reporting when the process fails
const STDERR_TAIL_LINES: usize = 16;

fn time_pattern() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| Regex::new(r"time=\s*(\d+):(\d{2}):(\d{2}(?:\.\d+)?)").unwrap())
}

/// Extract elapsed seconds from one engine status line
pub fn parse_time_field(line: &str) -> Option<f64> {
    let caps = time_pattern().captures(line)?;
    let hours: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// Convert elapsed seconds into a clamped completion fraction
pub fn fraction_of(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Consume a live status stream, emitting a fraction per matching line
///
/// Status lines are terminated by `\r` as well as `\n`. Returns the tail of
/// the stream so the caller can attach it to a process failure.
pub async fn feed_progress<R>(reader: R, duration: f64, progress: &ProgressSink) -> String
where
    R: AsyncRead + Unpin,
{
    let mut reader = reader;
    let mut chunk = [0u8; 4096];
    let mut line: Vec<u8> = Vec::new();
    let mut tail: Vec<String> = Vec::new();

    loop {
        let read = match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(_) => break,
        };
        for &byte in &chunk[..read] {
            if byte == b'\n' || byte == b'\r' {
                consume_line(&line, duration, progress, &mut tail);
                line.clear();
            } else {
                line.push(byte);
            }
        }
    }
    consume_line(&line, duration, progress, &mut tail);

    tail.join("\n")
}

fn consume_line(raw: &[u8], duration: f64, progress: &ProgressSink, tail: &mut Vec<String>) {
    if raw.is_empty() {
        return;
    }
    let line = String::from_utf8_lossy(raw);
    match parse_time_field(&line) {
        Some(elapsed) => progress(fraction_of(elapsed, duration)),
        None => trace!("unmatched engine status line: {}", line),
    }
    if tail.len() == STDERR_TAIL_LINES {
        tail.remove(0);
    }
    tail.push(line.into_owned());
}

//! Time parsing and formatting utilities

use crate::error::{LossCutError, LossCutResult};

/// Parse a time string to seconds
///
/// Accepts plain seconds (`12.5`), `MM:SS[.ms]`, and `HH:MM:SS[.ms]`.
pub fn parse_time(time_str: &str) -> LossCutResult<f64> {
    let time_str = time_str.trim();

    if let Ok(seconds) = time_str.parse::<f64>() {
        return Ok(seconds);
    }

    let parts: Vec<&str> = time_str.split(':').collect();
    let parsed: Option<Vec<f64>> = parts.iter().map(|p| p.parse::<f64>().ok()).collect();

    match parsed.as_deref() {
        Some([minutes, seconds]) => Ok(minutes * 60.0 + seconds),
        Some([hours, minutes, seconds]) => Ok(hours * 3600.0 + minutes * 60.0 + seconds),
        _ => Err(LossCutError::InvalidTimeFormat {
            time: time_str.to_string(),
        }),
    }
}

/// Format seconds as `HH:MM:SS.mmm` for display
pub fn format_time(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let hours = (seconds / 3600.0) as u32;
    let minutes = ((seconds % 3600.0) / 60.0) as u32;
    let secs = (seconds % 60.0) as u32;
    let milliseconds = ((seconds % 1.0) * 1000.0).round() as u32;

    format!(
        "{:02}:{:02}:{:02}.{:03}",
        hours,
        minutes,
        secs,
        milliseconds.min(999)
    )
}

/// Format seconds as a filename-safe timecode (`HH.MM.SS.mmm`)
pub fn filename_timecode(seconds: f64) -> String {
    format_time(seconds).replace(':', ".")
}

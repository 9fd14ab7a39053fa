//! Packet-timeline reading for keyframe resolution

use std::path::Path;

use serde::Deserialize;

use crate::engine::{BinaryKind, ProcessRunner};
use crate::error::{LossCutError, LossCutResult};

/// Probe window radius around a cut point, in seconds
pub const DEFAULT_WINDOW_SECS: f64 = 30.0;

/// One demuxed packet on a stream's timeline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaFrame {
    /// Presentation time in seconds
    pub time: f64,
    pub keyframe: bool,
}

#[derive(Debug, Deserialize)]
struct PacketEntry {
    #[serde(default)]
    pts_time: Option<String>,
    #[serde(default)]
    flags: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PacketDocument {
    #[serde(default)]
    packets: Vec<PacketEntry>,
}

/// Read the frame timeline of one stream, optionally restricted to a window
///
/// With `around_time` set, only `[around_time - window, around_time + window]`
/// (clamped at zero) is demuxed; a whole-stream scan on a large file is
/// far too slow for interactive use.
pub async fn read_frames(
    runner: &ProcessRunner,
    path: &Path,
    around_time: Option<f64>,
    window_secs: f64,
    stream_selector: &str,
) -> LossCutResult<Vec<MediaFrame>> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-v",
        "error",
        "-select_streams",
        stream_selector,
        "-show_packets",
        "-show_entries",
        "packet=pts_time,flags",
        "-of",
        "json",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    if let Some(at) = around_time {
        let from = (at - window_secs).max(0.0);
        let to = at + window_secs;
        args.push("-read_intervals".to_string());
        args.push(format!("{}%{}", from, to));
    }
    args.push(path.to_string_lossy().into_owned());

    let output = runner.run(BinaryKind::Probe, &args).await?;
    parse_packets(&output.stdout, path)
}

fn parse_packets(stdout: &[u8], path: &Path) -> LossCutResult<Vec<MediaFrame>> {
    let doc: PacketDocument = serde_json::from_slice(stdout).map_err(|e| LossCutError::Probe {
        message: format!("unparseable packet listing for {}: {}", path.display(), e),
    })?;

    let mut frames: Vec<MediaFrame> = doc
        .packets
        .into_iter()
        .filter_map(|p| {
            let time = p.pts_time.as_deref()?.parse::<f64>().ok()?;
            let keyframe = p.flags.as_deref().map(|f| f.starts_with('K')).unwrap_or(false);
            Some(MediaFrame { time, keyframe })
        })
        .collect();

    frames.sort_by(|a, b| a.time.total_cmp(&b.time));
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_packets_orders_by_time() {
        let json = r#"{"packets": [
            {"pts_time": "2.002", "flags": "__"},
            {"pts_time": "0.000", "flags": "K_"},
            {"pts_time": "1.001", "flags": "K__"}
        ]}"#;
        let frames = parse_packets(json.as_bytes(), Path::new("clip.mp4")).unwrap();
        assert_eq!(
            frames,
            vec![
                MediaFrame { time: 0.0, keyframe: true },
                MediaFrame { time: 1.001, keyframe: true },
                MediaFrame { time: 2.002, keyframe: false },
            ]
        );
    }

    #[test]
    fn test_parse_packets_skips_entries_without_pts() {
        let json = r#"{"packets": [
            {"flags": "K_"},
            {"pts_time": "N/A", "flags": "K_"},
            {"pts_time": "0.5", "flags": "__"}
        ]}"#;
        let frames = parse_packets(json.as_bytes(), Path::new("clip.mp4")).unwrap();
        assert_eq!(frames, vec![MediaFrame { time: 0.5, keyframe: false }]);
    }

    #[test]
    fn test_keyframe_flag_is_first_character() {
        let json = r#"{"packets": [
            {"pts_time": "0.0", "flags": "_K"},
            {"pts_time": "1.0", "flags": "K"}
        ]}"#;
        let frames = parse_packets(json.as_bytes(), Path::new("clip.mp4")).unwrap();
        assert!(!frames[0].keyframe);
        assert!(frames[1].keyframe);
    }

    #[test]
    fn test_malformed_json_is_a_probe_error() {
        let err = parse_packets(b"not json", Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, LossCutError::Probe { .. }));
    }
}

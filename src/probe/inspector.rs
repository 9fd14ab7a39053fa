//! Probe JSON interpretation
//!
//! All metadata here is rebuilt on every call; nothing is cached across
//! invocations because the file under the path may have changed.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::engine::{BinaryKind, ProcessRunner};
use crate::error::{LossCutError, LossCutResult};

/// Stream classification reported by the probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", rename_all = "lowercase")]
pub enum CodecType {
    Video,
    Audio,
    Subtitle,
    /// Data and any classification the probe reports that we do not model
    Data,
}

impl From<String> for CodecType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "video" => CodecType::Video,
            "audio" => CodecType::Audio,
            "subtitle" => CodecType::Subtitle,
            _ => CodecType::Data,
        }
    }
}

impl fmt::Display for CodecType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CodecType::Video => "video",
            CodecType::Audio => "audio",
            CodecType::Subtitle => "subtitle",
            CodecType::Data => "data",
        };
        write!(f, "{}", name)
    }
}

/// One stream as reported by the probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDescriptor {
    pub index: usize,
    #[serde(default)]
    pub codec_name: Option<String>,
    #[serde(default)]
    pub codec_tag_string: Option<String>,
    pub codec_type: CodecType,
    /// Rational such as `30000/1001`; `0/0` when the engine cannot tell
    #[serde(default)]
    pub avg_frame_rate: Option<String>,
}

impl StreamDescriptor {
    /// Average frame rate in frames per second, when the probe reports one
    pub fn frame_rate(&self) -> Option<f64> {
        let rate = self.avg_frame_rate.as_deref()?;
        let (num, den) = rate.split_once('/')?;
        let num: f64 = num.parse().ok()?;
        let den: f64 = den.parse().ok()?;
        if den == 0.0 || num <= 0.0 {
            return None;
        }
        Some(num / den)
    }
}

/// Container-level metadata for one source file
#[derive(Debug, Clone, Serialize)]
pub struct MediaInfo {
    pub path: PathBuf,
    /// Container duration in seconds
    pub duration: f64,
    /// Comma-separated candidate list as the probe reports it
    pub format_name: String,
    pub streams: Vec<StreamDescriptor>,
}

impl MediaInfo {
    /// Indexes of every probed stream, in probe order
    pub fn stream_indexes(&self) -> Vec<usize> {
        self.streams.iter().map(|s| s.index).collect()
    }

    /// The first video stream, if the container has one
    pub fn first_video_stream(&self) -> Option<&StreamDescriptor> {
        self.streams
            .iter()
            .find(|s| s.codec_type == CodecType::Video)
    }
}

#[derive(Debug, Deserialize)]
struct FormatSection {
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    format_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeDocument {
    #[serde(default)]
    format: Option<FormatSection>,
    #[serde(default)]
    streams: Vec<StreamDescriptor>,
}

/// Probe a media file's container format, duration, and streams
pub async fn probe_media(runner: &ProcessRunner, path: &Path) -> LossCutResult<MediaInfo> {
    let args: Vec<String> = [
        "-hide_banner",
        "-v",
        "error",
        "-show_format",
        "-show_streams",
        "-of",
        "json",
    ]
    .iter()
    .map(|s| s.to_string())
    .chain(std::iter::once(path.to_string_lossy().into_owned()))
    .collect();

    let output = runner.run(BinaryKind::Probe, &args).await?;
    parse_probe_output(&output.stdout, path)
}

fn parse_probe_output(stdout: &[u8], path: &Path) -> LossCutResult<MediaInfo> {
    let doc: ProbeDocument =
        serde_json::from_slice(stdout).map_err(|e| LossCutError::Probe {
            message: format!("unparseable probe output for {}: {}", path.display(), e),
        })?;

    let format = doc.format.ok_or_else(|| LossCutError::Probe {
        message: format!("probe output for {} has no format section", path.display()),
    })?;

    let duration = format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| LossCutError::Probe {
            message: format!("probe output for {} has no duration", path.display()),
        })?;

    Ok(MediaInfo {
        path: path.to_path_buf(),
        duration,
        format_name: format.format_name.unwrap_or_default(),
        streams: doc.streams,
    })
}

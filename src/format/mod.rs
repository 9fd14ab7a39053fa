//! Container format detection and per-stream extraction containers

use std::path::Path;

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::engine::ProcessRunner;
use crate::error::{LossCutError, LossCutResult};
use crate::probe::{probe_media, CodecType, MediaInfo};

/// Target container and extension for one output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFormatDecision {
    pub container_id: String,
    pub file_extension: String,
}

impl OutputFormatDecision {
    fn new(container_id: &str, file_extension: &str) -> Self {
        Self {
            container_id: container_id.to_string(),
            file_extension: file_extension.to_string(),
        }
    }
}

/// Bytes sniffed from the head of a file for content-type detection
const SNIFF_LEN: usize = 64;

/// Detect the output container identifier for a source file
///
/// The probe may report several comma-separated candidates; the file's
/// magic bytes break the tie when they identify a known member of that
/// list, else the first candidate wins. Ambiguous identifiers are then
/// remapped to the identifier the transcode engine expects as a target.
pub async fn detect_format(runner: &ProcessRunner, path: &Path) -> LossCutResult<String> {
    let info = probe_media(runner, path).await?;
    detect_format_for(&info).await
}

/// As [`detect_format`], reusing an already probed [`MediaInfo`]
pub async fn detect_format_for(info: &MediaInfo) -> LossCutResult<String> {
    let sniffed = sniff_path(&info.path).await;
    choose_format(&info.format_name, sniffed.as_deref())
}

/// Pick one candidate from a probed format list, honoring a sniffed type
pub fn choose_format(candidates_csv: &str, sniffed: Option<&str>) -> LossCutResult<String> {
    let candidates: Vec<&str> = candidates_csv
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .collect();

    let first = *candidates.first().ok_or_else(|| LossCutError::Probe {
        message: "probe reported no container format".to_string(),
    })?;

    let picked = sniffed
        .and_then(|s| candidates.iter().find(|c| **c == s).copied())
        .unwrap_or(first);

    Ok(canonical_format(picked).to_string())
}

/// Collapse probe identifiers that share a muxer onto the encoder target
fn canonical_format(format: &str) -> &str {
    match format {
        // Same ISO-BMFF audio payload; the engine's muxer is named "ipod".
        "m4a" | "ipod" => "ipod",
        "aac" => "adts",
        other => other,
    }
}

/// Default file extension for a container identifier
pub fn default_extension(container_id: &str) -> String {
    match container_id {
        "matroska" => "mkv".to_string(),
        "ipod" => "m4a".to_string(),
        "adts" => "aac".to_string(),
        "mpegts" => "ts".to_string(),
        "mov" => "mov".to_string(),
        other => other.to_string(),
    }
}

/// Sniff a file's content type from its leading bytes
pub async fn sniff_path(path: &Path) -> Option<String> {
    let mut file = tokio::fs::File::open(path).await.ok()?;
    let mut head = [0u8; SNIFF_LEN];
    let read = file.read(&mut head).await.ok()?;
    let sniffed = sniff_content_type(&head[..read]);
    debug!("sniffed content type for {}: {:?}", path.display(), sniffed);
    sniffed.map(str::to_string)
}

/// Identify a container family from a file's leading bytes
pub fn sniff_content_type(head: &[u8]) -> Option<&'static str> {
    if head.len() >= 12 && &head[4..8] == b"ftyp" {
        // ISO-BMFF: the major brand distinguishes the family members.
        return Some(match &head[8..12] {
            b"M4A " => "m4a",
            b"M4V " => "m4v",
            b"qt  " => "mov",
            b"3gp4" | b"3gp5" => "3gp",
            _ => "mp4",
        });
    }
    if head.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        // EBML: matroska and webm share the signature, the doctype in the
        // header decides which.
        let is_webm = head.windows(4).any(|w| w == b"webm");
        return Some(if is_webm { "webm" } else { "matroska" });
    }
    if head.len() >= 12 && head.starts_with(b"RIFF") {
        return match &head[8..12] {
            b"WAVE" => Some("wav"),
            b"AVI " => Some("avi"),
            _ => None,
        };
    }
    if head.starts_with(b"OggS") {
        return Some("ogg");
    }
    if head.starts_with(b"fLaC") {
        return Some("flac");
    }
    if head.starts_with(b"ID3") {
        return Some("mp3");
    }
    None
}

/// Preferred standalone container for one extracted stream
///
/// Known codecs get a purpose-built container; anything else falls back to
/// a generic choice keyed on the stream type alone. `None` means the
/// stream cannot be extracted and is skipped.
pub fn extraction_container(
    codec_name: Option<&str>,
    codec_type: CodecType,
) -> Option<OutputFormatDecision> {
    if let Some(name) = codec_name {
        let known = match name {
            "subrip" => Some(("srt", "srt")),
            "webvtt" => Some(("webvtt", "vtt")),
            "mov_text" => Some(("mp4", "mp4")),
            "aac" => Some(("adts", "aac")),
            "mp3" => Some(("mp3", "mp3")),
            "opus" => Some(("opus", "opus")),
            "vorbis" => Some(("ogg", "ogg")),
            "flac" => Some(("flac", "flac")),
            "pcm_s16le" | "pcm_s24le" | "pcm_s32le" => Some(("wav", "wav")),
            "h264" | "hevc" => Some(("matroska", "mkv")),
            "vp8" | "vp9" | "av1" => Some(("webm", "webm")),
            _ => None,
        };
        if let Some((container, extension)) = known {
            return Some(OutputFormatDecision::new(container, extension));
        }
    }

    let (container, extension) = match codec_type {
        CodecType::Video => ("matroska", "mkv"),
        CodecType::Audio => ("matroska", "mka"),
        CodecType::Subtitle => ("matroska", "mks"),
        CodecType::Data => ("data", "bin"),
    };
    Some(OutputFormatDecision::new(container, extension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniffed_type_breaks_candidate_tie() {
        let format = choose_format("mov,mp4,m4a,3gp,3g2,mj2", Some("mp4")).unwrap();
        assert_eq!(format, "mp4");
    }

    #[test]
    fn test_unrecognized_sniff_falls_back_to_first_candidate() {
        let format = choose_format("mov,mp4,m4a,3gp,3g2,mj2", None).unwrap();
        assert_eq!(format, "mov");
    }

    #[test]
    fn test_m4a_family_remaps_to_ipod() {
        assert_eq!(choose_format("m4a", None).unwrap(), "ipod");
        assert_eq!(choose_format("ipod", None).unwrap(), "ipod");
        assert_eq!(
            choose_format("mov,mp4,m4a,3gp,3g2,mj2", Some("m4a")).unwrap(),
            "ipod"
        );
    }

    #[test]
    fn test_aac_remaps_to_adts() {
        assert_eq!(choose_format("aac", None).unwrap(), "adts");
    }

    #[test]
    fn test_matroska_webm_candidates_split() {
        assert_eq!(choose_format("matroska,webm", Some("webm")).unwrap(), "webm");
        assert_eq!(choose_format("matroska,webm", None).unwrap(), "matroska");
    }

    #[test]
    fn test_empty_candidate_list_fails() {
        assert!(choose_format("", None).is_err());
    }

    #[test]
    fn test_sniff_iso_bmff_brands() {
        let mut head = vec![0, 0, 0, 24];
        head.extend_from_slice(b"ftypisom");
        head.extend_from_slice(&[0; 8]);
        assert_eq!(sniff_content_type(&head), Some("mp4"));

        let mut head = vec![0, 0, 0, 24];
        head.extend_from_slice(b"ftypM4A ");
        head.extend_from_slice(&[0; 8]);
        assert_eq!(sniff_content_type(&head), Some("m4a"));
    }

    #[test]
    fn test_sniff_ebml_doctype() {
        let mut head = vec![0x1A, 0x45, 0xDF, 0xA3];
        head.extend_from_slice(b"\x42\x82\x88matroska");
        assert_eq!(sniff_content_type(&head), Some("matroska"));

        let mut head = vec![0x1A, 0x45, 0xDF, 0xA3];
        head.extend_from_slice(b"\x42\x82\x84webm");
        assert_eq!(sniff_content_type(&head), Some("webm"));
    }

    #[test]
    fn test_sniff_unknown_bytes() {
        assert_eq!(sniff_content_type(b"plain text file"), None);
        assert_eq!(sniff_content_type(&[]), None);
    }

    #[test]
    fn test_extraction_container_for_known_codecs() {
        let decision = extraction_container(Some("subrip"), CodecType::Subtitle).unwrap();
        assert_eq!(decision, OutputFormatDecision::new("srt", "srt"));

        let decision = extraction_container(Some("aac"), CodecType::Audio).unwrap();
        assert_eq!(decision, OutputFormatDecision::new("adts", "aac"));
    }

    #[test]
    fn test_extraction_container_type_fallback() {
        let decision = extraction_container(Some("prores"), CodecType::Video).unwrap();
        assert_eq!(decision, OutputFormatDecision::new("matroska", "mkv"));

        let decision = extraction_container(None, CodecType::Subtitle).unwrap();
        assert_eq!(decision, OutputFormatDecision::new("matroska", "mks"));

        let decision = extraction_container(None, CodecType::Data).unwrap();
        assert_eq!(decision, OutputFormatDecision::new("data", "bin"));
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(default_extension("matroska"), "mkv");
        assert_eq!(default_extension("ipod"), "m4a");
        assert_eq!(default_extension("mp4"), "mp4");
    }
}

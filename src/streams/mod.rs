//! Per-stream extraction into standalone containers

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::engine::{BinaryKind, ProcessRunner};
use crate::error::LossCutResult;
use crate::format::{extraction_container, OutputFormatDecision};
use crate::probe::MediaInfo;
use crate::utils::path::stream_output_path;

/// Extract every stream of a probed file into its own container
///
/// Streams without an extraction decision are skipped with a warning;
/// everything else is copied, one sequential engine invocation per stream.
pub async fn extract_streams(
    runner: &ProcessRunner,
    info: &MediaInfo,
    out_dir: Option<&Path>,
) -> LossCutResult<Vec<PathBuf>> {
    let mut outputs = Vec::new();

    for stream in &info.streams {
        let codec_name = stream.codec_name.as_deref().unwrap_or("unknown");
        let Some(decision) = extraction_container(stream.codec_name.as_deref(), stream.codec_type)
        else {
            warn!(
                "stream {} ({} {}) has no extraction container; skipping",
                stream.index, stream.codec_type, codec_name
            );
            continue;
        };

        let output = stream_output_path(
            &info.path,
            out_dir,
            stream.index,
            stream.codec_type,
            codec_name,
            &decision.file_extension,
        );
        let args = plan_extract(&info.path, stream.index, &decision, &output);

        info!(
            "extracting stream {} ({} {}) to {}",
            stream.index,
            stream.codec_type,
            codec_name,
            output.display()
        );
        runner.run(BinaryKind::Transcode, &args).await?;
        outputs.push(output);
    }

    Ok(outputs)
}

/// Argument vector copying one stream into a standalone container
fn plan_extract(
    source: &Path,
    stream_index: usize,
    decision: &OutputFormatDecision,
    output: &Path,
) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-i".to_string(),
        source.to_string_lossy().into_owned(),
        "-map".to_string(),
        format!("0:{}", stream_index),
        "-c".to_string(),
        "copy".to_string(),
        "-f".to_string(),
        decision.container_id.clone(),
        "-y".to_string(),
        output.to_string_lossy().into_owned(),
    ]
}

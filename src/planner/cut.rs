//! Stream-copy cut command planning

use std::path::PathBuf;

use crate::error::{LossCutError, LossCutResult};

/// Streams to include from one source file
///
/// A selection with no stream ids contributes nothing to the command.
#[derive(Debug, Clone)]
pub struct StreamSelection {
    pub source_path: PathBuf,
    pub stream_ids: Vec<usize>,
}

/// Everything the planner needs for one single-segment stream-copy cut
#[derive(Debug, Clone)]
pub struct CutParams {
    /// Target container identifier for the output
    pub output_format: String,
    /// Cut start, seconds relative to the source
    pub cut_from: f64,
    /// Cut end, seconds relative to the source
    pub cut_to: f64,
    pub source_duration: f64,
    /// Rotation metadata override for the first video stream, degrees
    pub rotation: Option<u32>,
    pub selections: Vec<StreamSelection>,
    /// Seek before the inputs (fast, keyframe-snapped) instead of after
    pub keyframe_cut: bool,
    pub output_path: PathBuf,
}

/// Build the transcode argument vector for one stream-copy cut
///
/// An inverted range is rejected here rather than passed through to the
/// engine; out-of-range boundaries degrade to cut-from-start / cut-to-end.
pub fn plan_cut(params: &CutParams) -> LossCutResult<Vec<String>> {
    if params.cut_from >= params.cut_to {
        return Err(LossCutError::InvalidCutRange {
            from: params.cut_from,
            to: params.cut_to,
        });
    }

    let active: Vec<&StreamSelection> = params
        .selections
        .iter()
        .filter(|s| !s.stream_ids.is_empty())
        .collect();
    if active.is_empty() {
        return Err(LossCutError::EmptySelection);
    }

    let cuts_from_start = params.cut_from <= 0.0;
    let cuts_to_end = params.cut_to >= params.source_duration;

    // Trimming at the true start or end is omitted entirely; forcing a
    // no-op trim can still disturb container timestamps on remux.
    let mut trim_args: Vec<String> = Vec::new();
    if !cuts_from_start {
        trim_args.push("-ss".to_string());
        trim_args.push(params.cut_from.to_string());
    }
    if !cuts_to_end {
        let duration = params.cut_to.min(params.source_duration) - params.cut_from.max(0.0);
        trim_args.push("-t".to_string());
        trim_args.push(duration.to_string());
    }

    let mut args: Vec<String> = vec!["-hide_banner".to_string()];

    // Keyframe-cut mode seeks before the demuxer opens the inputs.
    if params.keyframe_cut {
        args.extend(trim_args.iter().cloned());
    }
    for selection in &active {
        args.push("-i".to_string());
        args.push(selection.source_path.to_string_lossy().into_owned());
    }
    if !params.keyframe_cut {
        args.extend(trim_args.iter().cloned());
    }

    args.push("-c".to_string());
    args.push("copy".to_string());

    for (file_index, selection) in active.iter().enumerate() {
        for stream_id in &selection.stream_ids {
            args.push("-map".to_string());
            args.push(format!("{}:{}", file_index, stream_id));
        }
    }

    args.push("-map_metadata".to_string());
    args.push("0".to_string());
    args.push("-ignore_unknown".to_string());

    if params.keyframe_cut {
        args.push("-avoid_negative_ts".to_string());
        args.push("make_zero".to_string());
    }

    if let Some(degrees) = params.rotation {
        args.push("-metadata:s:v:0".to_string());
        args.push(format!("rotate={}", degrees));
    }

    args.push("-f".to_string());
    args.push(params.output_format.clone());
    args.push("-y".to_string());
    args.push(params.output_path.to_string_lossy().into_owned());

    Ok(args)
}

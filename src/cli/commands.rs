//! Command implementations

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::batch::{BatchParams, Coordinator, CutSegment, MergeParams};
use crate::cli::args::{CutArgs, ExtractArgs, MergeArgs, ProbeArgs};
use crate::config::Config;
use crate::engine::{ProcessRunner, ProgressSink};
use crate::error::LossCutResult;
use crate::format::{default_extension, detect_format_for};
use crate::planner::{resolve_boundary, Direction, StreamSelection};
use crate::ports::{FsTimestampCarrier, FsTrashSink, TracingCommandLog};
use crate::probe::{probe_media, read_frames, MediaInfo, DEFAULT_WINDOW_SECS};
use crate::streams::extract_streams;
use crate::utils::path::merge_output_path;
use crate::utils::time::parse_time;

/// Stream selector used when snapping cut points to keyframes
const VIDEO_SELECTOR: &str = "v:0";

fn build_runner(tool_dir: Option<PathBuf>, config: &Config) -> Arc<ProcessRunner> {
    let tool_dir = tool_dir.or_else(|| config.tool_dir.clone());
    Arc::new(ProcessRunner::new(tool_dir, Arc::new(TracingCommandLog)))
}

fn build_coordinator(runner: Arc<ProcessRunner>) -> Coordinator {
    Coordinator::new(runner, Arc::new(FsTimestampCarrier), Arc::new(FsTrashSink))
}

/// Progress sink logging whole-percent changes of the aggregate fraction
fn console_progress() -> ProgressSink {
    let last_percent = AtomicU64::new(u64::MAX);
    Arc::new(move |fraction| {
        let percent = (fraction * 100.0).round() as u64;
        if last_percent.swap(percent, Ordering::Relaxed) != percent {
            info!("progress: {}%", percent);
        }
    })
}

/// Resolve output container and file extension for a probed source
async fn negotiate_output_format(info: &MediaInfo) -> LossCutResult<(String, String)> {
    let container = detect_format_for(info).await?;
    let extension = default_extension(&container);
    Ok((container, extension))
}

/// Snap one segment's boundaries onto valid stream-copy cut points
async fn snap_segment(
    runner: &ProcessRunner,
    path: &Path,
    source_duration: f64,
    segment: CutSegment,
) -> LossCutResult<CutSegment> {
    let mut snapped = segment;
    if segment.cut_from > 0.0 {
        let frames = read_frames(
            runner,
            path,
            Some(segment.cut_from),
            DEFAULT_WINDOW_SECS,
            VIDEO_SELECTOR,
        )
        .await?;
        snapped.cut_from =
            resolve_boundary(&frames, segment.cut_from, Direction::Next)?.apply_to(segment.cut_from);
    }
    if segment.cut_to < source_duration {
        let frames = read_frames(
            runner,
            path,
            Some(segment.cut_to),
            DEFAULT_WINDOW_SECS,
            VIDEO_SELECTOR,
        )
        .await?;
        snapped.cut_to =
            resolve_boundary(&frames, segment.cut_to, Direction::Prev)?.apply_to(segment.cut_to);
    }
    if snapped != segment {
        info!(
            "snapped segment {}s..{}s to {}s..{}s",
            segment.cut_from, segment.cut_to, snapped.cut_from, snapped.cut_to
        );
    }
    Ok(snapped)
}

/// Execute the cut command
pub async fn cut(args: CutArgs, tool_dir: Option<PathBuf>, config: &Config) -> Result<()> {
    if args.from.len() != args.to.len() {
        bail!(
            "every --from needs a matching --to ({} vs {})",
            args.from.len(),
            args.to.len()
        );
    }

    let runner = build_runner(tool_dir, config);
    let info = probe_media(&runner, &args.input)
        .await
        .context("Failed to probe input file")?;
    let (output_format, file_extension) = negotiate_output_format(&info).await?;
    info!(
        "probed {}: {:.3}s, {} streams, output container {}",
        args.input.display(),
        info.duration,
        info.streams.len(),
        output_format
    );

    let mut segments = Vec::with_capacity(args.from.len());
    for (from, to) in args.from.iter().zip(&args.to) {
        segments.push(CutSegment {
            cut_from: parse_time(from)?,
            cut_to: parse_time(to)?,
        });
    }

    let keyframe_cut = !args.precise && config.keyframe_cut;
    if keyframe_cut && info.first_video_stream().is_some() {
        let mut snapped = Vec::with_capacity(segments.len());
        for segment in segments {
            snapped.push(snap_segment(&runner, &args.input, info.duration, segment).await?);
        }
        segments = snapped;
    }

    let stream_ids = if args.streams.is_empty() {
        info.stream_indexes()
    } else {
        args.streams.clone()
    };
    let params = BatchParams {
        source: args.input.clone(),
        source_duration: info.duration,
        output_format,
        file_extension,
        selections: vec![StreamSelection {
            source_path: args.input.clone(),
            stream_ids,
        }],
        keyframe_cut,
        rotation: args.rotation,
        out_dir: args.out_dir.or_else(|| config.output_dir.clone()),
    };

    let coordinator = build_coordinator(runner);
    let outputs = coordinator
        .cut_multiple(&segments, &params, console_progress())
        .await
        .context("Cut batch failed")?;

    for output in &outputs {
        println!("{}", output.display());
    }
    Ok(())
}

/// Execute the merge command
pub async fn merge(args: MergeArgs, tool_dir: Option<PathBuf>, config: &Config) -> Result<()> {
    let runner = build_runner(tool_dir, config);

    let mut total_duration = 0.0;
    let mut first_info: Option<MediaInfo> = None;
    for input in &args.inputs {
        let info = probe_media(&runner, input)
            .await
            .with_context(|| format!("Failed to probe {}", input.display()))?;
        total_duration += info.duration;
        if first_info.is_none() {
            first_info = Some(info);
        }
    }
    let first_info = first_info.context("merge requires at least one input")?;
    let (output_format, file_extension) = negotiate_output_format(&first_info).await?;

    let out_dir = args.out_dir.or_else(|| config.output_dir.clone());
    let params = MergeParams {
        paths: args.inputs.clone(),
        total_duration,
        output_format,
        output_path: merge_output_path(&args.inputs[0], out_dir.as_deref(), &file_extension),
        include_all_streams: args.all_streams,
    };
    info!(
        "merging {} files ({:.3}s) into {}",
        params.paths.len(),
        total_duration,
        params.output_path.display()
    );

    let coordinator = build_coordinator(runner);
    let progress = console_progress();
    if args.auto_delete {
        coordinator.auto_merge(&params, &progress).await?;
    } else {
        coordinator.merge(&params, &progress).await?;
    }

    println!("{}", params.output_path.display());
    Ok(())
}

/// Execute the extract command
pub async fn extract(args: ExtractArgs, tool_dir: Option<PathBuf>, config: &Config) -> Result<()> {
    let runner = build_runner(tool_dir, config);
    let info = probe_media(&runner, &args.input)
        .await
        .context("Failed to probe input file")?;

    let out_dir = args.out_dir.or_else(|| config.output_dir.clone());
    let outputs = extract_streams(&runner, &info, out_dir.as_deref())
        .await
        .context("Stream extraction failed")?;

    for output in &outputs {
        println!("{}", output.display());
    }
    Ok(())
}

/// Execute the probe command
pub async fn probe(args: ProbeArgs, tool_dir: Option<PathBuf>, config: &Config) -> Result<()> {
    let runner = build_runner(tool_dir, config);
    let info = probe_media(&runner, &args.input)
        .await
        .context("Failed to probe input file")?;

    let json = serde_json::to_string_pretty(&info).context("Failed to serialize probe result")?;
    println!("{}", json);

    if args.frames {
        let around = args.around.as_deref().map(parse_time).transpose()?;
        let frames = read_frames(
            &runner,
            &args.input,
            around,
            DEFAULT_WINDOW_SECS,
            VIDEO_SELECTOR,
        )
        .await?;
        println!();
        for frame in &frames {
            println!(
                "{:>12.6}  {}",
                frame.time,
                if frame.keyframe { "K" } else { "-" }
            );
        }
        info!("listed {} frames", frames.len());
    }
    Ok(())
}

//! Multi-segment cut coordination, aggregate progress, and merging

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::engine::{ProcessRunner, ProgressSink};
use crate::error::LossCutResult;
use crate::planner::{plan_cut, CutParams, StreamSelection};
use crate::ports::{TimestampCarrier, TrashSink};
use crate::utils::path::cut_output_path;

/// Deletions allowed in flight after an auto-merge
const MAX_CONCURRENT_TRASH: usize = 5;

/// One contiguous cut request, seconds relative to the source
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutSegment {
    pub cut_from: f64,
    pub cut_to: f64,
}

/// Parameters shared by every segment of a batch
#[derive(Debug, Clone)]
pub struct BatchParams {
    pub source: PathBuf,
    pub source_duration: f64,
    pub output_format: String,
    pub file_extension: String,
    pub selections: Vec<StreamSelection>,
    pub keyframe_cut: bool,
    pub rotation: Option<u32>,
    pub out_dir: Option<PathBuf>,
}

/// Options for a concat merge
#[derive(Debug, Clone)]
pub struct MergeParams {
    pub paths: Vec<PathBuf>,
    pub total_duration: f64,
    pub output_format: String,
    pub output_path: PathBuf,
    /// Map every stream of the first input instead of the default streams
    pub include_all_streams: bool,
}

/// Drives cut and merge batches through the engine, one process at a time
pub struct Coordinator {
    runner: Arc<ProcessRunner>,
    timestamps: Arc<dyn TimestampCarrier>,
    trash: Arc<dyn TrashSink>,
}

impl Coordinator {
    pub fn new(
        runner: Arc<ProcessRunner>,
        timestamps: Arc<dyn TimestampCarrier>,
        trash: Arc<dyn TrashSink>,
    ) -> Self {
        Self {
            runner,
            timestamps,
            trash,
        }
    }

    /// Cut one segment: plan, execute with streaming progress, then carry
    /// the source timestamps onto the output
    pub async fn cut_single(
        &self,
        params: &CutParams,
        progress: &ProgressSink,
    ) -> LossCutResult<()> {
        let args = plan_cut(params)?;
        progress(0.0);

        let duration = params.cut_to.min(params.source_duration) - params.cut_from.max(0.0);
        self.runner
            .run_transcode_streaming(&args, None, duration, progress)
            .await?;

        if let Some(selection) = params.selections.iter().find(|s| !s.stream_ids.is_empty()) {
            if let Err(e) = self
                .timestamps
                .transfer(&selection.source_path, &params.output_path)
                .await
            {
                warn!(
                    "could not transfer timestamps onto {}: {}",
                    params.output_path.display(),
                    e
                );
            }
        }
        Ok(())
    }

    /// Cut every segment sequentially, aggregating per-segment progress
    /// into one overall fraction
    ///
    /// Segments are sorted by start time first. A failing segment aborts
    /// the remaining batch; partially produced outputs are left in place.
    pub async fn cut_multiple(
        &self,
        segments: &[CutSegment],
        params: &BatchParams,
        on_progress: ProgressSink,
    ) -> LossCutResult<Vec<PathBuf>> {
        let ordered = order_segments(segments);
        let (sender, aggregator) = spawn_aggregator(ordered.len(), on_progress);

        let mut outputs = Vec::with_capacity(ordered.len());
        let result = async {
            for (index, segment) in ordered.iter().enumerate() {
                let output_path = cut_output_path(
                    &params.source,
                    params.out_dir.as_deref(),
                    segment.cut_from,
                    segment.cut_to,
                    &params.file_extension,
                );
                info!(
                    "cutting segment {}/{}: {}s..{}s -> {}",
                    index + 1,
                    ordered.len(),
                    segment.cut_from,
                    segment.cut_to,
                    output_path.display()
                );

                let cut_params = CutParams {
                    output_format: params.output_format.clone(),
                    cut_from: segment.cut_from,
                    cut_to: segment.cut_to,
                    source_duration: params.source_duration,
                    rotation: params.rotation,
                    selections: params.selections.clone(),
                    keyframe_cut: params.keyframe_cut,
                    output_path: output_path.clone(),
                };

                let segment_sender = sender.clone();
                let segment_sink: ProgressSink = Arc::new(move |fraction| {
                    let _ = segment_sender.send((index, fraction));
                });
                self.cut_single(&cut_params, &segment_sink).await?;

                // A finished segment counts as fully complete even when the
                // engine's last status line stopped short of the end.
                let _ = sender.send((index, 1.0));
                outputs.push(output_path);
            }
            Ok(outputs)
        }
        .await;

        drop(sender);
        let _ = aggregator.await;
        result
    }

    /// Merge files by stream copy through the concat reader
    ///
    /// The listing is fed over stdin so paths never pass through the
    /// engine's protocol whitelist as command-line arguments.
    pub async fn merge(&self, params: &MergeParams, progress: &ProgressSink) -> LossCutResult<()> {
        let listing = concat_listing(&params.paths);
        let args = plan_merge(params);
        progress(0.0);

        self.runner
            .run_transcode_streaming(
                &args,
                Some(listing.into_bytes()),
                params.total_duration,
                progress,
            )
            .await?;

        if let Some(first) = params.paths.first() {
            if let Err(e) = self.timestamps.transfer(first, &params.output_path).await {
                warn!(
                    "could not transfer timestamps onto {}: {}",
                    params.output_path.display(),
                    e
                );
            }
        }
        Ok(())
    }

    /// Merge, then discard the consumed segment files
    pub async fn auto_merge(
        &self,
        params: &MergeParams,
        progress: &ProgressSink,
    ) -> LossCutResult<()> {
        self.merge(params, progress).await?;

        futures::stream::iter(params.paths.iter())
            .for_each_concurrent(MAX_CONCURRENT_TRASH, |path| async move {
                if let Err(e) = self.trash.discard(path).await {
                    warn!("could not discard {}: {}", path.display(), e);
                }
            })
            .await;
        Ok(())
    }
}

/// Segments sorted by start time, ready for sequential processing
pub fn order_segments(segments: &[CutSegment]) -> Vec<CutSegment> {
    let mut ordered = segments.to_vec();
    ordered.sort_by(|a, b| a.cut_from.partial_cmp(&b.cut_from).unwrap_or(Ordering::Equal));
    ordered
}

/// Spawn the task that owns per-segment fractions for one batch
///
/// Every `(segment index, fraction)` update recomputes the arithmetic mean
/// over all segments and re-emits it; the task ends when the last sender
/// is dropped.
pub fn spawn_aggregator(
    segment_count: usize,
    on_progress: ProgressSink,
) -> (mpsc::UnboundedSender<(usize, f64)>, JoinHandle<()>) {
    let (sender, mut receiver) = mpsc::unbounded_channel::<(usize, f64)>();
    let handle = tokio::spawn(async move {
        let mut fractions = vec![0.0f64; segment_count];
        while let Some((index, fraction)) = receiver.recv().await {
            if let Some(slot) = fractions.get_mut(index) {
                *slot = fraction;
            }
            if !fractions.is_empty() {
                on_progress(fractions.iter().sum::<f64>() / fractions.len() as f64);
            }
        }
    });
    (sender, handle)
}

/// Render the concat-demuxer listing for a set of inputs
///
/// Single quotes are escaped for the demuxer's directive parser.
fn concat_listing(paths: &[PathBuf]) -> String {
    let mut listing = String::new();
    for path in paths {
        let escaped = path.to_string_lossy().replace('\'', "'\\''");
        let _ = writeln!(listing, "file '{}'", escaped);
    }
    listing
}

/// Argument vector for a concat merge reading its listing from stdin
fn plan_merge(params: &MergeParams) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-hide_banner".to_string(),
        "-f".to_string(),
        "concat".to_string(),
        "-safe".to_string(),
        "0".to_string(),
        "-protocol_whitelist".to_string(),
        "file,pipe".to_string(),
        "-i".to_string(),
        "-".to_string(),
    ];
    if params.include_all_streams {
        args.push("-map".to_string());
        args.push("0".to_string());
    }
    args.push("-c".to_string());
    args.push("copy".to_string());
    args.push("-f".to_string());
    args.push(params.output_format.clone());
    args.push("-y".to_string());
    args.push(params.output_path.to_string_lossy().into_owned());
    args
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_segments_are_ordered_by_start_time() {
        let segments = vec![
            CutSegment { cut_from: 5.0, cut_to: 10.0 },
            CutSegment { cut_from: 0.0, cut_to: 3.0 },
        ];
        let ordered = order_segments(&segments);
        assert_eq!(ordered[0], CutSegment { cut_from: 0.0, cut_to: 3.0 });
        assert_eq!(ordered[1], CutSegment { cut_from: 5.0, cut_to: 10.0 });
    }

    #[tokio::test]
    async fn test_aggregate_progress_is_the_mean() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ProgressSink = Arc::new(move |f| sink_seen.lock().unwrap().push(f));

        let (sender, handle) = spawn_aggregator(2, sink);
        sender.send((0, 1.0)).unwrap();
        sender.send((1, 0.5)).unwrap();
        drop(sender);
        handle.await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![0.5, 0.75]);
    }

    #[tokio::test]
    async fn test_aggregate_reaches_one_only_when_all_segments_do() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ProgressSink = Arc::new(move |f| sink_seen.lock().unwrap().push(f));

        let (sender, handle) = spawn_aggregator(3, sink);
        sender.send((0, 1.0)).unwrap();
        sender.send((1, 1.0)).unwrap();
        sender.send((2, 0.99)).unwrap();
        sender.send((2, 1.0)).unwrap();
        drop(sender);
        handle.await.unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen[..seen.len() - 1].iter().all(|f| *f < 1.0));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_aggregator_keeps_latest_fraction_per_segment() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ProgressSink = Arc::new(move |f| sink_seen.lock().unwrap().push(f));

        let (sender, handle) = spawn_aggregator(1, sink);
        sender.send((0, 0.2)).unwrap();
        sender.send((0, 0.6)).unwrap();
        drop(sender);
        handle.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![0.2, 0.6]);
    }

    #[test]
    fn test_concat_listing_escapes_quotes() {
        let listing = concat_listing(&[
            PathBuf::from("/media/part one.mp4"),
            PathBuf::from("/media/it's.mp4"),
        ]);
        assert_eq!(
            listing,
            "file '/media/part one.mp4'\nfile '/media/it'\\''s.mp4'\n"
        );
    }

    #[test]
    fn test_plan_merge_reads_listing_from_stdin() {
        let params = MergeParams {
            paths: vec![PathBuf::from("/a.mp4"), PathBuf::from("/b.mp4")],
            total_duration: 20.0,
            output_format: "mp4".to_string(),
            output_path: PathBuf::from("/a-merged.mp4"),
            include_all_streams: false,
        };
        let args = plan_merge(&params);
        let concat = args.iter().position(|a| a == "concat").unwrap();
        assert_eq!(args[concat - 1], "-f");
        assert!(args.contains(&"-".to_string()));
        assert!(args.contains(&"file,pipe".to_string()));
        assert!(!args.iter().any(|a| a == "-map"));
        assert_eq!(args.last().unwrap(), "/a-merged.mp4");
    }

    #[test]
    fn test_plan_merge_optionally_maps_all_streams() {
        let params = MergeParams {
            paths: vec![PathBuf::from("/a.mp4")],
            total_duration: 10.0,
            output_format: "matroska".to_string(),
            output_path: PathBuf::from("/a-merged.mkv"),
            include_all_streams: true,
        };
        let args = plan_merge(&params);
        let map = args.iter().position(|a| a == "-map").unwrap();
        assert_eq!(args[map + 1], "0");
    }
}

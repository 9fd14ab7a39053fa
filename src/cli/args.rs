//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Segment start time (HH:MM:SS.ms, MM:SS.ms, or seconds); repeatable
    #[arg(long = "from", required = true)]
    pub from: Vec<String>,

    /// Segment end time, one per --from
    #[arg(long = "to", required = true)]
    pub to: Vec<String>,

    /// Trim after opening the inputs (frame-precise, slower)
    #[arg(long)]
    pub precise: bool,

    /// Only include these stream indexes (default: every probed stream)
    #[arg(long)]
    pub streams: Vec<usize>,

    /// Rotation metadata override for the first video stream (degrees)
    #[arg(long)]
    pub rotation: Option<u32>,

    /// Output directory (default: alongside the input)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the merge command
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// Files to merge, in order; all must share one stream layout
    #[arg(required = true, num_args = 2..)]
    pub inputs: Vec<PathBuf>,

    /// Map every stream of the first input
    #[arg(long)]
    pub all_streams: bool,

    /// Discard the input segments after a successful merge
    #[arg(long)]
    pub auto_delete: bool,

    /// Output directory (default: alongside the first input)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the extract command
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output directory (default: alongside the input)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Also list the frame timeline of the first video stream
    #[arg(long)]
    pub frames: bool,

    /// Restrict the frame listing to a window around this time
    #[arg(long, requires = "frames")]
    pub around: Option<String>,
}

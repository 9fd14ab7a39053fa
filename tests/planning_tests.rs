//! End-to-end command planning tests
//!
//! These exercise the public planning surface the way the CLI drives it,
//! without touching the external engine binaries.

use std::path::{Path, PathBuf};

use losscut::batch::order_segments;
use losscut::planner::{plan_cut, CutParams, StreamSelection};
use losscut::utils::path::cut_output_path;
use losscut::CutSegment;

fn params(keyframe_cut: bool) -> CutParams {
    CutParams {
        output_format: "mp4".to_string(),
        cut_from: 5.0,
        cut_to: 10.0,
        source_duration: 60.0,
        rotation: None,
        selections: vec![StreamSelection {
            source_path: PathBuf::from("/media/in.mp4"),
            stream_ids: vec![0, 1],
        }],
        keyframe_cut,
        output_path: PathBuf::from("/media/out.mp4"),
    }
}

#[test]
fn test_keyframe_cut_full_command() {
    let args = plan_cut(&params(true)).unwrap();
    assert_eq!(
        args,
        vec![
            "-hide_banner",
            "-ss",
            "5",
            "-t",
            "5",
            "-i",
            "/media/in.mp4",
            "-c",
            "copy",
            "-map",
            "0:0",
            "-map",
            "0:1",
            "-map_metadata",
            "0",
            "-ignore_unknown",
            "-avoid_negative_ts",
            "make_zero",
            "-f",
            "mp4",
            "-y",
            "/media/out.mp4",
        ]
    );
}

#[test]
fn test_precise_cut_full_command() {
    let args = plan_cut(&params(false)).unwrap();
    assert_eq!(
        args,
        vec![
            "-hide_banner",
            "-i",
            "/media/in.mp4",
            "-ss",
            "5",
            "-t",
            "5",
            "-c",
            "copy",
            "-map",
            "0:0",
            "-map",
            "0:1",
            "-map_metadata",
            "0",
            "-ignore_unknown",
            "-f",
            "mp4",
            "-y",
            "/media/out.mp4",
        ]
    );
}

#[test]
fn test_batch_outputs_follow_sorted_segment_order() {
    let segments = vec![
        CutSegment {
            cut_from: 5.0,
            cut_to: 10.0,
        },
        CutSegment {
            cut_from: 0.0,
            cut_to: 3.0,
        },
    ];

    let outputs: Vec<PathBuf> = order_segments(&segments)
        .iter()
        .map(|s| {
            cut_output_path(
                Path::new("/media/in.mp4"),
                None,
                s.cut_from,
                s.cut_to,
                "mp4",
            )
        })
        .collect();

    assert_eq!(
        outputs,
        vec![
            PathBuf::from("/media/in-00.00.00.000-00.00.03.000.mp4"),
            PathBuf::from("/media/in-00.00.05.000-00.00.10.000.mp4"),
        ]
    );
}

//! Keyframe-aligned cut-boundary resolution
//!
//! Stream copy can only produce a decodable output when it begins on a
//! keyframe. These routines find the minimal boundary shift satisfying that
//! constraint in each direction, preferring no shift whenever the requested
//! boundary is already valid.

use crate::error::{LossCutError, LossCutResult};
use crate::probe::MediaFrame;

/// Tolerance when comparing cut points to frame times, in seconds
const ALIGNMENT_EPSILON: f64 = 0.01;

/// Which way a boundary may move to reach a valid stream-copy cut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Segment start: snap forward to the next keyframe
    Next,
    /// Segment end: snap backward to just before a keyframe
    Prev,
}

/// Outcome of resolving one cut boundary
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    /// The requested time already satisfies the stream-copy constraint
    Unchanged,
    /// The boundary must move to this time
    Adjusted(f64),
}

impl Boundary {
    /// The effective cut time after resolution
    pub fn apply_to(self, cut_time: f64) -> f64 {
        match self {
            Boundary::Unchanged => cut_time,
            Boundary::Adjusted(time) => time,
        }
    }
}

/// Resolve one cut boundary against a frame timeline
///
/// The timeline must hold at least two frames, sorted by time ascending.
pub fn resolve_boundary(
    frames: &[MediaFrame],
    cut_time: f64,
    direction: Direction,
) -> LossCutResult<Boundary> {
    if frames.len() < 2 {
        return Err(LossCutError::InsufficientFrames { cut_time });
    }
    match direction {
        Direction::Next => resolve_next(frames, cut_time),
        Direction::Prev => resolve_prev(frames, cut_time),
    }
}

/// A segment start must land on a keyframe at or after the cut point
fn resolve_next(frames: &[MediaFrame], cut_time: f64) -> LossCutResult<Boundary> {
    let index = frames
        .iter()
        .position(|f| f.keyframe && f.time >= cut_time - ALIGNMENT_EPSILON)
        .ok_or(LossCutError::NoKeyframeFound { cut_time })?;

    if index == frames.len() - 1 {
        return Err(LossCutError::TerminalFrame { cut_time });
    }

    let time = frames[index].time;
    if (time - cut_time).abs() <= ALIGNMENT_EPSILON {
        Ok(Boundary::Unchanged)
    } else {
        Ok(Boundary::Adjusted(time))
    }
}

/// A segment end must land just before a keyframe so the preceding GOP
/// stays intact under stream copy
fn resolve_prev(frames: &[MediaFrame], cut_time: f64) -> LossCutResult<Boundary> {
    let index = frames
        .iter()
        .rposition(|f| f.time <= cut_time + ALIGNMENT_EPSILON)
        .ok_or(LossCutError::NoPriorFrame { cut_time })?;

    if index == 0 {
        return Err(LossCutError::FirstFrame { cut_time });
    }

    // Last frame of the timeline, or the following frame opens a new GOP:
    // the cut already ends cleanly here.
    if index == frames.len() - 1 || frames[index + 1].keyframe {
        return Ok(Boundary::Unchanged);
    }

    let keyframe_index = frames[..=index]
        .iter()
        .rposition(|f| f.keyframe)
        .ok_or(LossCutError::NoPriorFrame { cut_time })?;

    if keyframe_index == 0 {
        return Err(LossCutError::FirstFrame { cut_time });
    }

    Ok(Boundary::Adjusted(frames[keyframe_index - 1].time))
}

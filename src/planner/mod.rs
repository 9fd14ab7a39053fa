//! Cut-boundary resolution and stream-copy command planning

pub mod cut;
pub mod keyframe;

pub use cut::{plan_cut, CutParams, StreamSelection};
pub use keyframe::{resolve_boundary, Boundary, Direction};

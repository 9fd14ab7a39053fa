//! Container and stream metadata probing

pub mod frames;
pub mod inspector;

pub use frames::{read_frames, MediaFrame, DEFAULT_WINDOW_SECS};
pub use inspector::{probe_media, CodecType, MediaInfo, StreamDescriptor};

//! Output path derivation for cut, merge, and extraction products

use std::path::{Path, PathBuf};

use crate::probe::CodecType;
use crate::utils::time::filename_timecode;

/// Directory an output lands in: the requested directory, else next to the source
fn output_dir(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    }
}

fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string())
}

/// Output path for one cut segment, named by its time range
pub fn cut_output_path(
    source: &Path,
    out_dir: Option<&Path>,
    cut_from: f64,
    cut_to: f64,
    extension: &str,
) -> PathBuf {
    let name = format!(
        "{}-{}-{}.{}",
        source_stem(source),
        filename_timecode(cut_from),
        filename_timecode(cut_to),
        extension
    );
    output_dir(source, out_dir).join(name)
}

/// Output path for a merged file, named after the first input
pub fn merge_output_path(first_source: &Path, out_dir: Option<&Path>, extension: &str) -> PathBuf {
    let name = format!("{}-merged.{}", source_stem(first_source), extension);
    output_dir(first_source, out_dir).join(name)
}

/// Output path for one extracted stream
pub fn stream_output_path(
    source: &Path,
    out_dir: Option<&Path>,
    stream_index: usize,
    codec_type: CodecType,
    codec_name: &str,
    extension: &str,
) -> PathBuf {
    let name = format!(
        "{}-stream-{}-{}-{}.{}",
        source_stem(source),
        stream_index,
        codec_type,
        codec_name,
        extension
    );
    output_dir(source, out_dir).join(name)
}

//! Segment extraction: cut detected time windows out of a downloaded file.
//!
//! Each window `[x1, x2)` becomes `{base}_{x1}_{x2}{ext}` next to the
//! original, with the offsets spelled exactly as in the detection table
//! (`1.50` stays `1.50`). Once every window is cut the original is removed;
//! with no windows the original is kept as a plain download.

mod ffmpeg;

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::error::ItemError;
use crate::lookups::DetectionCoordinate;
use crate::storage;

pub use ffmpeg::FfmpegTrimmer;

/// Raw trimming primitive: write `[start, end)` seconds of `src` to `dest`,
/// re-encoded in the container implied by `dest`'s extension. Blocking.
pub trait Trimmer: Send + Sync {
    fn trim(&self, src: &Path, dest: &Path, start: f64, end: f64) -> Result<()>;
}

/// Output filename for one window.
pub fn segment_name(base_name: &str, start: &str, end: &str, extension: &str) -> String {
    format!("{}_{}_{}{}", base_name, start, end, extension)
}

/// Cut every coordinate out of `source` into `output_dir`.
///
/// All coordinates are attempted even if one fails. On any failure the
/// original is kept and `ItemError::Trim` is returned; otherwise the original
/// is deleted best-effort and the produced paths are returned in coordinate
/// order.
pub fn extract(
    trimmer: &dyn Trimmer,
    source: &Path,
    coordinates: &[DetectionCoordinate],
    output_dir: &Path,
    base_name: &str,
    extension: &str,
) -> Result<Vec<PathBuf>, ItemError> {
    if coordinates.is_empty() {
        return Ok(Vec::new());
    }

    let mut produced = Vec::with_capacity(coordinates.len());
    let mut errors = Vec::new();
    for c in coordinates {
        let dest = output_dir.join(segment_name(base_name, &c.start_text, &c.end_text, extension));
        match trimmer.trim(source, &dest, c.start, c.end) {
            Ok(()) => produced.push(dest),
            Err(e) => {
                tracing::warn!(src = %source.display(), start = c.start, end = c.end, "segment failed: {:#}", e);
                errors.push(format!("[{}, {}): {:#}", c.start, c.end, e));
            }
        }
    }

    if !errors.is_empty() {
        return Err(ItemError::Trim {
            failed: errors.len(),
            total: coordinates.len(),
            message: errors.join("; "),
        });
    }

    storage::remove_best_effort(source);
    Ok(produced)
}

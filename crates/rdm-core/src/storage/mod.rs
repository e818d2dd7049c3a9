//! Disk I/O and file lifecycle for downloaded bodies.
//!
//! Bodies are written to `<target>.part`, synced, then renamed onto the final
//! name, so an interrupted run never leaves a truncated file under the final
//! name. Directory creation tolerates concurrent creators.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::ItemError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `clip.wav` → `clip.wav.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Create `dir` and its parents. "Already exists" is success, including when
/// another worker created it between our check and our call.
pub fn ensure_dir(dir: &Path) -> Result<(), ItemError> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(ItemError::fs("create dir", dir, e)),
    }
}

/// Write `data` to `final_path` via a synced `.part` file and a rename.
/// An existing file at `final_path` is replaced.
pub fn write_atomic(final_path: &Path, data: &[u8]) -> Result<(), ItemError> {
    let tmp = temp_path(final_path);
    let write = || -> io::Result<()> {
        let mut f = File::create(&tmp)?;
        f.write_all(data)?;
        f.sync_all()
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(ItemError::fs("write", tmp, e));
    }
    fs::rename(&tmp, final_path).map_err(|e| ItemError::fs("rename", final_path, e))
}

/// Remove a file, logging instead of failing. Returns whether the file is gone.
pub fn remove_best_effort(path: &Path) -> bool {
    match fs::remove_file(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), "could not delete original after trimming: {}", e);
            false
        }
    }
}

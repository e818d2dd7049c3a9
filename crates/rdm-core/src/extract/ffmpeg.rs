//! Trimming via an `ffmpeg` subprocess.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use super::Trimmer;

/// Runs `ffmpeg -i SRC -ss START -to END DEST`.
///
/// `-ss`/`-to` are output options, so seeking is decode-accurate and the
/// window is `[start, end)`. No `-c copy`: the output is re-encoded in the
/// container implied by the destination extension.
#[derive(Debug, Clone)]
pub struct FfmpegTrimmer {
    binary: PathBuf,
}

impl FfmpegTrimmer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn command(&self, src: &Path, dest: &Path, start: f64, end: f64) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"])
            .arg(src)
            .arg("-ss")
            .arg(start.to_string())
            .arg("-to")
            .arg(end.to_string())
            .arg(dest);
        cmd
    }
}

impl Default for FfmpegTrimmer {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Trimmer for FfmpegTrimmer {
    fn trim(&self, src: &Path, dest: &Path, start: f64, end: f64) -> Result<()> {
        let mut cmd = self.command(src, dest, start, end);
        tracing::debug!(?cmd, "trimming segment");
        let output = cmd
            .output()
            .with_context(|| format!("spawn {}", self.binary.display()))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let tail: String = stderr.lines().rev().take(3).collect::<Vec<_>>().join(" | ");
            anyhow::bail!("ffmpeg exited with {}: {}", output.status, tail);
        }
        Ok(())
    }
}

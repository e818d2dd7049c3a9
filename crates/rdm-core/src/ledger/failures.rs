//! Explicit failure list: one JSON object per line.
//!
//! Failed items are still marked done in the ledger; this file is what an
//! operator uses to find and deliberately retry them.

use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::LedgerError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub id: String,
    pub url: String,
    /// `ItemError::kind()` label.
    pub kind: String,
    pub message: String,
}

/// Lazily created append handle for `{stem}.failed.jsonl`.
#[derive(Debug)]
pub struct FailureLog {
    path: PathBuf,
    file: Option<File>,
}

impl FailureLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&mut self, record: &FailureRecord) -> Result<(), LedgerError> {
        let write_err = |source| LedgerError::Write {
            path: self.path.clone(),
            source,
        };
        let mut line = serde_json::to_string(record)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        line.push('\n');

        if self.file.is_none() {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.path)
                .map_err(write_err)?;
            self.file = Some(f);
        }
        if let Some(f) = self.file.as_mut() {
            f.write_all(line.as_bytes()).map_err(write_err)?;
        }
        Ok(())
    }
}

/// Read every well-formed record; torn or foreign lines are skipped.
pub fn load_failures(path: &Path) -> Result<Vec<FailureRecord>, LedgerError> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(LedgerError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    Ok(contents
        .lines()
        .filter_map(|l| serde_json::from_str(l).ok())
        .collect())
}

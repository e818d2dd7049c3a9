//! Append-only resume ledger and failure list, one pair per input source.
//!
//! The ledger file is a `;`-terminated list of identifiers. An entry counts
//! only once its terminator is on disk, so a crash mid-append can lose at
//! most that one entry and never produces a merged identifier.
//!
//! Both files are written by a single owner (the coordinator's drain loop);
//! neither type does internal locking.

mod failures;
mod file;

use std::path::{Path, PathBuf};

pub use failures::{load_failures, FailureLog, FailureRecord};
pub use file::{load, parse, Ledger, SEPARATOR};

/// Ledger and failure-list write/read errors.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("append {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Identifier that cannot be stored in the `;`-delimited format.
    #[error("identifier {0:?} cannot be recorded")]
    InvalidId(String),
}

/// `{stem}.downloaded.txt` in `state_dir`.
pub fn ledger_path(state_dir: &Path, stem: &str) -> PathBuf {
    state_dir.join(format!("{}.downloaded.txt", stem))
}

/// `{stem}.failed.jsonl` in `state_dir`.
pub fn failures_path(state_dir: &Path, stem: &str) -> PathBuf {
    state_dir.join(format!("{}.failed.jsonl", stem))
}

#[cfg(test)]
mod tests;

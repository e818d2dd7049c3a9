//! Per-item error taxonomy.
//!
//! Everything here is caught at the worker boundary: the item is logged,
//! written to the failure list, and still marked done in the ledger.

use std::path::PathBuf;

use crate::fetch::FetchError;

/// Why a single item could not be processed.
#[derive(Debug, thiserror::Error)]
pub enum ItemError {
    /// Fetch failed or the server returned a non-2xx status.
    #[error("transport: {0}")]
    Transport(#[from] FetchError),

    /// Write, create or delete failure under the output tree.
    #[error("filesystem: {op} {}: {source}", path.display())]
    Filesystem {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Classification code with no matching name.
    #[error("lookup: unknown {table} code {code:?}")]
    Lookup { table: &'static str, code: String },

    /// Malformed timestamp, coordinate, or missing required field.
    #[error("parse: {field}: {message}")]
    Parse { field: String, message: String },

    /// The trimming primitive failed for one or more coordinates.
    #[error("trim: {failed} of {total} segment(s) failed: {message}")]
    Trim {
        failed: usize,
        total: usize,
        message: String,
    },
}

impl ItemError {
    pub(crate) fn fs(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ItemError::Filesystem {
            op,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(field: impl Into<String>, message: impl Into<String>) -> Self {
        ItemError::Parse {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short stable label used in logs and the failure list.
    pub fn kind(&self) -> &'static str {
        match self {
            ItemError::Transport(_) => "transport",
            ItemError::Filesystem { .. } => "filesystem",
            ItemError::Lookup { .. } => "lookup",
            ItemError::Parse { .. } => "parse",
            ItemError::Trim { .. } => "trim",
        }
    }

    /// Lookup failures point at a configuration defect rather than a flaky item.
    pub fn is_config_defect(&self) -> bool {
        matches!(self, ItemError::Lookup { .. })
    }
}

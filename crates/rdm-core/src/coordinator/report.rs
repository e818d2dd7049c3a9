//! Per-source run reports and on-disk status.

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use crate::config::RdmConfig;
use crate::ledger;
use crate::source::{self, SourceTable, URL_FIELD};

/// Why a source was not dispatched at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No `url` column: an auxiliary table, not a download source.
    NoUrlColumn,
    /// Has URLs but no identifier column is configured for it.
    NoIdMapping,
    /// Ledger already holds as many ids as the source has rows.
    AlreadyComplete,
}

/// Outcome of one source.
#[derive(Debug, Clone, Default)]
pub struct SourceReport {
    pub source: String,
    /// Rows in the source.
    pub total: usize,
    /// Ledger entries found when the source was scanned.
    pub already_done: usize,
    pub dispatched: usize,
    pub completed: usize,
    pub failed: usize,
    /// Rows with an empty URL (not recorded).
    pub no_url: usize,
    /// Rows without an identifier (never dispatched).
    pub missing_id: usize,
    /// Repeated identifiers within the source (dispatched once).
    pub duplicates: usize,
    /// Final files written (downloads or segments).
    pub files: usize,
    pub elapsed: Duration,
    pub skipped: Option<SkipReason>,
    pub cancelled: bool,
}

impl SourceReport {
    pub(crate) fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub(crate) fn skipped(source: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            skipped: Some(reason),
            ..Self::new(source)
        }
    }

    /// Entries this run added to the ledger.
    pub fn recorded(&self) -> usize {
        self.completed + self.failed
    }
}

/// All sources of one `run_all`, in processing order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    /// Sources that failed at the source level (unreadable table, ledger I/O).
    pub errors: Vec<(String, String)>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.sources.iter().map(|s| s.completed).sum()
    }

    pub fn failed(&self) -> usize {
        self.sources.iter().map(|s| s.failed).sum()
    }
}

/// Resume state of one download source, read from disk only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStatus {
    pub source: String,
    pub total: usize,
    pub ledgered: usize,
    pub failures: usize,
    /// Whether a configured identifier column exists for this source.
    pub mapped: bool,
}

impl SourceStatus {
    pub fn is_complete(&self) -> bool {
        self.ledgered >= self.total
    }
}

/// Status of every download source (tables with a `url` column) in `input_dir`.
pub fn source_status(input_dir: &Path, cfg: &RdmConfig) -> Result<Vec<SourceStatus>> {
    let mut out = Vec::new();
    for path in source::list_csv_files(input_dir)? {
        let table = SourceTable::read(&path)?;
        if !table.has_field(URL_FIELD) {
            continue;
        }
        let ledgered = ledger::load(&ledger::ledger_path(input_dir, &table.stem))?.len();
        let failures = ledger::load_failures(&ledger::failures_path(input_dir, &table.stem))?.len();
        out.push(SourceStatus {
            mapped: cfg.id_field_for(table.name()).is_some(),
            source: table.stem,
            total: table.rows.len(),
            ledgered,
            failures,
        });
    }
    Ok(out)
}

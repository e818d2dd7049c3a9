//! Per-item processing: resolve layout, fetch, persist, extract segments.
//!
//! `process` is blocking and runs on the tokio blocking pool. It never
//! returns an error: every per-item failure is folded into `ItemOutcome`.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::error::ItemError;
use crate::extract::{self, Trimmer};
use crate::fetch::{self, Transport};
use crate::item::{self, WorkItem};
use crate::layout;
use crate::lookups::Lookups;
use crate::retry::RetryPolicy;
use crate::source::{non_empty, Row, URL_FIELD};
use crate::storage;

/// Everything a worker needs for one source. Built once per source and
/// shared read-only by all workers.
pub struct RunContext {
    /// Source stem, for logs.
    pub source: String,
    pub id_field: String,
    pub timestamp_format: String,
    pub output_root: PathBuf,
    pub lookups: Arc<Lookups>,
    pub transport: Arc<dyn Transport>,
    pub trimmer: Arc<dyn Trimmer>,
    pub retry: RetryPolicy,
    /// Ledger contents when dispatch started.
    pub done: Arc<HashSet<String>>,
}

#[derive(Debug)]
pub enum ItemOutcome {
    /// Already in the ledger snapshot; nothing was done.
    AlreadyDone,
    /// Empty URL; nothing to fetch.
    NoUrl,
    /// Final files on disk: the download itself, or its segments.
    Completed { files: Vec<PathBuf> },
    /// Handled failure. Still recorded as done.
    Failed { url: String, error: ItemError },
}

impl ItemOutcome {
    /// Whether the id goes into the ledger.
    pub fn is_recorded(&self) -> bool {
        matches!(self, ItemOutcome::Completed { .. } | ItemOutcome::Failed { .. })
    }
}

#[derive(Debug)]
pub struct ItemResult {
    pub id: String,
    pub outcome: ItemOutcome,
}

fn fetch_and_file(item: &WorkItem, ctx: &RunContext) -> Result<Vec<PathBuf>, ItemError> {
    let dest = layout::resolve(item, &ctx.lookups, &ctx.output_root)?;
    storage::ensure_dir(&dest.dir)?;

    let body = fetch::fetch_with_retry(ctx.transport.as_ref(), &item.url, &ctx.retry)?;
    let target = dest.path();
    storage::write_atomic(&target, &body)?;
    tracing::debug!(source = %ctx.source, id = %item.id, bytes = body.len(), path = %target.display(), "downloaded");

    let coordinates = ctx.lookups.coordinates_for(item);
    if coordinates.is_empty() {
        return Ok(vec![target]);
    }
    let segments = extract::extract(
        ctx.trimmer.as_ref(),
        &target,
        coordinates,
        &dest.dir,
        dest.base_name(),
        dest.extension(),
    )?;
    tracing::debug!(source = %ctx.source, id = %item.id, segments = segments.len(), "segments extracted");
    Ok(segments)
}

/// Process one row.
pub fn process(row: &Row, ctx: &RunContext) -> ItemResult {
    let id = item::row_id(row, &ctx.id_field).unwrap_or_default().to_string();

    if ctx.done.contains(&id) {
        return ItemResult {
            id,
            outcome: ItemOutcome::AlreadyDone,
        };
    }
    let Some(url) = non_empty(row, URL_FIELD) else {
        return ItemResult {
            id,
            outcome: ItemOutcome::NoUrl,
        };
    };

    let result = WorkItem::from_row(row, &ctx.id_field, &ctx.timestamp_format)
        .and_then(|item| fetch_and_file(&item, ctx));

    let outcome = match result {
        Ok(files) => ItemOutcome::Completed { files },
        Err(error) => ItemOutcome::Failed {
            url: url.to_string(),
            error,
        },
    };
    ItemResult { id, outcome }
}

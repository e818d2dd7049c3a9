//! One source: scan, dispatch onto a bounded JoinSet, drain into the ledger.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc::Sender;
use tokio::task::{JoinError, JoinSet};

use crate::item;
use crate::ledger::{self, FailureLog, FailureRecord, Ledger, LedgerError};
use crate::lookups::RECORDING_ID_FIELD;
use crate::source::{SourceTable, URL_FIELD};
use crate::worker::{self, ItemOutcome, ItemResult, RunContext};

use super::progress::ProgressStats;
use super::report::{SkipReason, SourceReport};
use super::{Coordinator, Phase};

/// Drain-side state. Owned by the coordinator task only.
struct Drain<'a> {
    ledger: Ledger,
    failures: FailureLog,
    report: SourceReport,
    started: Instant,
    progress_tx: Option<&'a Sender<ProgressStats>>,
}

impl Drain<'_> {
    fn joined(&mut self, res: Result<ItemResult, JoinError>) -> Result<()> {
        match res {
            Ok(result) => self.record(result),
            Err(e) => {
                // The id is lost with the task; it stays pending for the next run.
                tracing::error!(source = %self.report.source, "worker task failed: {}", e);
                Ok(())
            }
        }
    }

    fn record(&mut self, result: ItemResult) -> Result<()> {
        let ItemResult { id, outcome } = result;
        let source = self.report.source.clone();
        match outcome {
            ItemOutcome::AlreadyDone => return Ok(()),
            ItemOutcome::NoUrl => {
                tracing::debug!(source = %source, id = %id, "empty url, skipped");
                self.report.no_url += 1;
                return Ok(());
            }
            ItemOutcome::Completed { files } => {
                self.report.completed += 1;
                self.report.files += files.len();
            }
            ItemOutcome::Failed { url, error } => {
                if error.is_config_defect() {
                    tracing::error!(source = %source, id = %id, kind = error.kind(), "{}", error);
                } else {
                    tracing::warn!(source = %source, id = %id, kind = error.kind(), "{}", error);
                }
                let record = FailureRecord {
                    id: id.clone(),
                    url,
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                };
                if let Err(e) = self.failures.append(&record) {
                    tracing::warn!(source = %source, id = %id, "failure list: {}", e);
                }
                self.report.failed += 1;
            }
        }

        match self.ledger.mark_done(&id) {
            Ok(_) => {}
            Err(LedgerError::InvalidId(id)) => {
                tracing::error!(source = %source, id = %id, "identifier cannot be recorded in the ledger");
            }
            Err(e) => return Err(e).context("ledger append"),
        }

        if let Some(tx) = self.progress_tx {
            let _ = tx.try_send(ProgressStats {
                source,
                done: self.report.recorded(),
                failed: self.report.failed,
                total: self.report.dispatched,
                elapsed_secs: self.started.elapsed().as_secs_f64(),
            });
        }
        Ok(())
    }
}

impl Coordinator {
    /// Run one source to completion (or cancellation).
    pub async fn run_source(&self, table: SourceTable) -> Result<SourceReport> {
        let started = Instant::now();
        let stem = table.stem.clone();
        let name = table.name().to_string();
        tracing::debug!(source = %stem, phase = ?Phase::Scanning, "scanning");

        if !table.has_field(URL_FIELD) {
            tracing::debug!(source = %stem, "no url column, not a download source");
            return Ok(SourceReport::skipped(stem, SkipReason::NoUrlColumn));
        }
        let Some(id_field) = self.cfg.id_field_for(&name).map(str::to_string) else {
            tracing::error!(source = %stem, "no identifier column configured for {:?}, skipping", name);
            return Ok(SourceReport::skipped(stem, SkipReason::NoIdMapping));
        };

        let total = table.rows.len();
        let ledger_path = ledger::ledger_path(&self.input_dir, &stem);
        let ledger = Ledger::open(&ledger_path)
            .with_context(|| format!("open ledger {}", ledger_path.display()))?;
        if ledger.len() == total {
            tracing::info!(source = %stem, total, "already complete");
            return Ok(SourceReport {
                total,
                already_done: ledger.len(),
                elapsed: started.elapsed(),
                ..SourceReport::skipped(stem, SkipReason::AlreadyComplete)
            });
        }

        let mut report = SourceReport::new(&stem);
        report.total = total;
        report.already_done = ledger.len();

        let recordings = id_field == RECORDING_ID_FIELD;
        let mut seen = HashSet::new();
        let mut pending = Vec::new();
        for row in table.rows {
            let Some(id) = item::row_id(&row, &id_field) else {
                report.missing_id += 1;
                continue;
            };
            if ledger.contains(id) {
                continue;
            }
            if self.detected_only && !(recordings && self.lookups.has_detections(id)) {
                continue;
            }
            if !seen.insert(id.to_string()) {
                report.duplicates += 1;
                continue;
            }
            pending.push(row);
        }
        if report.missing_id > 0 {
            tracing::warn!(source = %stem, rows = report.missing_id, field = %id_field, "rows without identifier");
        }
        if report.duplicates > 0 {
            tracing::warn!(source = %stem, rows = report.duplicates, "duplicate identifiers dispatched once");
        }

        let ctx = Arc::new(RunContext {
            source: stem.clone(),
            id_field,
            timestamp_format: self.cfg.timestamp_format.clone(),
            output_root: self.output_root(&name),
            lookups: Arc::clone(&self.lookups),
            transport: Arc::clone(&self.transport),
            trimmer: Arc::clone(&self.trimmer),
            retry: self.retry_policy(),
            done: ledger.snapshot(),
        });

        let workers = self.cfg.worker_count();
        tracing::info!(source = %stem, total, pending = pending.len(), workers, phase = ?Phase::Dispatching, "dispatching");

        let mut drain = Drain {
            ledger,
            failures: FailureLog::new(ledger::failures_path(&self.input_dir, &stem)),
            report,
            started: Instant::now(),
            progress_tx: self.progress_tx.as_ref(),
        };
        let mut queue = pending.into_iter();
        let mut join_set = JoinSet::new();
        let mut draining = false;

        loop {
            while join_set.len() < workers && !self.control.is_cancelled() {
                let Some(row) = queue.next() else {
                    break;
                };
                let ctx = Arc::clone(&ctx);
                join_set.spawn_blocking(move || worker::process(&row, &ctx));
                drain.report.dispatched += 1;
            }
            if queue.len() == 0 && !draining {
                draining = true;
                tracing::debug!(source = %stem, in_flight = join_set.len(), phase = ?Phase::Draining, "all items dispatched");
            }

            if join_set.is_empty() {
                break;
            }

            tokio::select! {
                biased;
                _ = self.control.cancelled() => {
                    while let Some(res) = join_set.try_join_next() {
                        drain.joined(res)?;
                    }
                    tracing::warn!(source = %stem, abandoned = join_set.len(), "interrupted, in-flight items abandoned");
                    join_set.abort_all();
                    drain.report.cancelled = true;
                    break;
                }
                res = join_set.join_next() => {
                    let Some(res) = res else {
                        break;
                    };
                    drain.joined(res)?;
                }
            }
        }
        if self.control.is_cancelled() && queue.len() > 0 {
            drain.report.cancelled = true;
        }

        let mut report = drain.report;
        report.elapsed = started.elapsed();
        tracing::info!(
            source = %stem,
            completed = report.completed,
            failed = report.failed,
            no_url = report.no_url,
            files = report.files,
            elapsed_secs = report.elapsed.as_secs_f64(),
            cancelled = report.cancelled,
            phase = ?Phase::Done,
            "source finished"
        );
        Ok(report)
    }
}

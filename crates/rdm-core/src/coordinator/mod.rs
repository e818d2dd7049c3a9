//! Download coordinator.
//!
//! Walks every CSV source in the input directory and, per source, runs
//! Scanning → Dispatching → Draining → Done. Workers run on the blocking
//! pool; the drain loop is the only writer of the ledger and failure list.

mod progress;
mod report;
mod run;

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::RdmConfig;
use crate::control::RunControl;
use crate::extract::Trimmer;
use crate::fetch::Transport;
use crate::lookups::Lookups;
use crate::retry::RetryPolicy;
use crate::source::{self, SourceTable};

pub use progress::ProgressStats;
pub use report::{source_status, RunSummary, SkipReason, SourceReport, SourceStatus};

/// Lifecycle of one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Scanning,
    Dispatching,
    Draining,
    Done,
}

pub struct Coordinator {
    cfg: RdmConfig,
    input_dir: PathBuf,
    output_dir: PathBuf,
    detected_only: bool,
    lookups: Arc<Lookups>,
    transport: Arc<dyn Transport>,
    trimmer: Arc<dyn Trimmer>,
    control: Arc<RunControl>,
    progress_tx: Option<tokio::sync::mpsc::Sender<ProgressStats>>,
}

impl Coordinator {
    pub fn new(
        cfg: RdmConfig,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        lookups: Lookups,
        transport: Arc<dyn Transport>,
        trimmer: Arc<dyn Trimmer>,
    ) -> Self {
        Self {
            cfg,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            detected_only: false,
            lookups: Arc::new(lookups),
            transport,
            trimmer,
            control: Arc::new(RunControl::new()),
            progress_tx: None,
        }
    }

    /// Only dispatch rows that have detections, into `cfg.detected_dir`.
    pub fn detected_only(mut self, on: bool) -> Self {
        self.detected_only = on;
        self
    }

    pub fn with_control(mut self, control: Arc<RunControl>) -> Self {
        self.control = control;
        self
    }

    /// Send a `ProgressStats` after each ledgered result. Sends never block.
    pub fn with_progress(mut self, tx: tokio::sync::mpsc::Sender<ProgressStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn control(&self) -> &Arc<RunControl> {
        &self.control
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.cfg
            .retry
            .as_ref()
            .map(RetryPolicy::from)
            .unwrap_or_default()
    }

    fn output_root(&self, source_name: &str) -> PathBuf {
        if self.detected_only {
            self.output_dir.join(&self.cfg.detected_dir)
        } else {
            self.output_dir.join(source_name)
        }
    }

    /// Run every source in the input directory, in file-name order.
    ///
    /// A source-level failure (unreadable table or ledger) is logged, recorded
    /// in the summary and does not stop the remaining sources. Cancellation
    /// stops after the current source.
    pub async fn run_all(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        for path in source::list_csv_files(&self.input_dir)? {
            if self.control.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let stem = source::file_stem(&path);
            let result = match SourceTable::read(&path) {
                Ok(table) => self.run_source(table).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(report) => {
                    let cancelled = report.cancelled;
                    summary.sources.push(report);
                    if cancelled {
                        summary.cancelled = true;
                        break;
                    }
                }
                Err(e) => {
                    tracing::error!(source = %stem, "source aborted: {:#}", e);
                    summary.errors.push((stem, format!("{:#}", e)));
                }
            }
        }
        Ok(summary)
    }
}

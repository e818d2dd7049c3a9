//! Progress reporting for a source run (items done, rate, ETA).
//!
//! Sent by the coordinator after each ledgered result; consumers can compute
//! rate = done / elapsed_secs and ETA = (total - done) / rate.

/// Snapshot of one source's progress (CLI-friendly).
#[derive(Debug, Clone)]
pub struct ProgressStats {
    /// Source stem.
    pub source: String,
    /// Items recorded in the ledger this run (completed or failed).
    pub done: usize,
    /// Of `done`, how many failed.
    pub failed: usize,
    /// Items dispatched this run.
    pub total: usize,
    /// Elapsed time since dispatch started (seconds).
    pub elapsed_secs: f64,
}

impl ProgressStats {
    /// Items per second (0 if elapsed is 0).
    pub fn items_per_sec(&self) -> f64 {
        if self.elapsed_secs <= 0.0 {
            return 0.0;
        }
        self.done as f64 / self.elapsed_secs
    }

    /// Estimated seconds remaining (None if rate is 0).
    pub fn eta_secs(&self) -> Option<f64> {
        let remaining = self.total.saturating_sub(self.done);
        if remaining == 0 {
            return Some(0.0);
        }
        let rate = self.items_per_sec();
        if rate <= 0.0 {
            return None;
        }
        Some(remaining as f64 / rate)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.done as f64 / self.total as f64).min(1.0)
    }
}

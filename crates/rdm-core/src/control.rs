//! Run control: a shared cancellation token.
//!
//! The coordinator checks the token between dispatches and selects on
//! `cancelled()` while draining. `watch_ctrl_c` wires SIGINT to it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Error returned when a run stops because cancellation was requested.
#[derive(Debug)]
pub struct RunCancelled;

impl std::fmt::Display for RunCancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "run interrupted by user")
    }
}

impl std::error::Error for RunCancelled {}

#[derive(Debug, Default)]
pub struct RunControl {
    cancelled: AtomicBool,
    notify: Notify,
}

impl RunControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent; wakes every pending `cancelled()`.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once `cancel` has been called.
    pub async fn cancelled(&self) {
        loop {
            // Register before checking so a concurrent cancel is not missed.
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Cancel `control` on the first Ctrl-C. The listener task lives until the
/// signal arrives or the runtime shuts down.
pub fn watch_ctrl_c(control: Arc<RunControl>) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping dispatch");
            control.cancel();
        }
    });
}

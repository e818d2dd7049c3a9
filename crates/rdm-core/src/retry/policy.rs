use std::time::Duration;

use crate::config::RetryConfig;

/// Why a fetch attempt failed, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    /// 429 or 503.
    Throttled,
    /// Connect, DNS, reset.
    Connection,
    /// Any other 5xx.
    Http5xx(u16),
    /// 4xx, bad URL, local I/O. Retrying will not help.
    Other,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    NoRetry,
    RetryAfter(Duration),
}

/// Attempt budget and backoff for one item's fetch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Attempts per item, counting the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

/// Seconds from config to a delay within `[0, cap]`. NaN and negatives are
/// zero; anything too large for `Duration` is the cap.
fn clamped_secs(secs: f64, cap: Duration) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs).map_or(cap, |d| d.min(cap))
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let max_delay = Duration::from_secs(cfg.max_delay_secs);
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: clamped_secs(cfg.base_delay_secs, max_delay),
            max_delay,
        }
    }
}

impl RetryPolicy {
    /// Delay before attempt `attempt + 1`: `base * 2^(attempt-1)`, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(8);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// `attempt` is 1-based and counts the attempt that just failed.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            RetryDecision::NoRetry
        } else {
            RetryDecision::RetryAfter(self.backoff(attempt))
        }
    }
}

//! Attempt counting with capped exponential backoff.

use std::time::Duration;

/// Exponential base for backoff.
const BACKOFF_BASE: u32 = 2;

/// Retry policy owned by one supervised socket (or the re-join tier).
///
/// The delay before retry `n` is `min(cap, unit * 2^n)`. The counter only
/// goes back to zero on [`reset`](Self::reset), which callers invoke after
/// every successful connect.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    attempt: u32,
    max_attempts: u32,
    unit: Duration,
    cap: Duration,
}

impl RetryPolicy {
    /// Policy counting backoff in whole seconds.
    pub fn new(max_attempts: u32, cap: Duration) -> Self {
        Self::with_unit(max_attempts, Duration::from_secs(1), cap)
    }

    /// Policy with a custom backoff unit.
    pub fn with_unit(max_attempts: u32, unit: Duration, cap: Duration) -> Self {
        Self {
            attempt: 0,
            max_attempts,
            unit,
            cap,
        }
    }

    /// Failures recorded since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = BACKOFF_BASE.saturating_pow(attempt);
        self.unit.saturating_mul(factor).min(self.cap)
    }

    /// Count a failure.
    ///
    /// Returns the delay to sleep before retrying, or `None` once the attempt
    /// budget is spent.
    pub fn record_failure(&mut self) -> Option<Duration> {
        self.attempt = self.attempt.saturating_add(1);
        (self.attempt <= self.max_attempts).then(|| self.backoff(self.attempt))
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

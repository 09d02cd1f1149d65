use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::domain::Attempts;
use crate::error::GtopError;

const DEFAULT_DELAY_MS: u64 = 200;

/// Bounded retry with a linear back-off between tries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: Attempts,
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: Attempts, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// No sleeping between attempts.
    pub fn immediate(attempts: Attempts) -> Self {
        Self::new(attempts, Duration::ZERO)
    }

    pub fn attempts(&self) -> Attempts {
        self.attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn with_attempts(self, attempts: Attempts) -> Self {
        Self { attempts, ..self }
    }

    /// Calls `attempt` until it succeeds or the attempt budget is spent.
    /// Exhausting the budget is reported as `None`, never as an error.
    pub fn run<R, F>(&self, url: &str, mut attempt: F) -> Option<R>
    where
        F: FnMut() -> Result<R, GtopError>,
    {
        let total = self.attempts.get();
        for number in 1..=total {
            match attempt() {
                Ok(value) => return Some(value),
                Err(err) => {
                    debug!(url = %url, attempt = number, total, error = %err, "request attempt failed");
                    if number < total && !self.delay.is_zero() {
                        thread::sleep(self.backoff(number));
                    }
                }
            }
        }
        warn!(url = %url, attempts = total, "no data after exhausting retries");
        None
    }

    /// Pause after the given failed attempt; saturates instead of overflowing.
    pub(crate) fn backoff(&self, attempt: u32) -> Duration {
        self.delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Attempts::DEFAULT, Duration::from_millis(DEFAULT_DELAY_MS))
    }
}

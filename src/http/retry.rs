//! Transport retry policy
//!
//! The pagination core never retries. Anything here applies to a single
//! page request and is invisible to the page cursor.

use crate::error::Error;
use crate::types::BackoffType;
use std::time::Duration;

/// How many times, and how far apart, one request may be re-sent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = send once)
    pub max_retries: u32,
    /// Growth of the delay between attempts
    pub backoff: BackoffType,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any computed delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryPolicy {
    /// Send every request exactly once
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: BackoffType::Exponential,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Retry up to `max_retries` times with the given backoff
    pub fn new(max_retries: u32, backoff: BackoffType) -> Self {
        Self {
            max_retries,
            backoff,
            ..Self::none()
        }
    }

    /// Override the delay bounds
    #[must_use]
    pub fn with_delays(mut self, initial: Duration, max: Duration) -> Self {
        self.initial_delay = initial;
        self.max_delay = max;
        self
    }

    /// Delay before retry number `attempt + 1`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = match self.backoff {
            BackoffType::Constant => self.initial_delay,
            BackoffType::Linear => self.initial_delay.saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => self
                .initial_delay
                .saturating_mul(2u32.saturating_pow(attempt)),
        };
        delay.min(self.max_delay)
    }

    /// Whether a failed attempt should be sent again
    ///
    /// Only transient transport failures qualify: refused connections,
    /// timeouts, throttling and gateway-class statuses. Decode failures and
    /// client errors never do.
    pub fn should_retry(&self, error: &Error, attempt: u32) -> bool {
        if attempt >= self.max_retries {
            return false;
        }
        match error {
            Error::Http(e) => e.is_connect(),
            Error::HttpStatus { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            Error::Timeout { .. } | Error::RateLimited { .. } => true,
            _ => false,
        }
    }
}

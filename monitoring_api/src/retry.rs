//! Retry policy and the retry state machine driven by the executor.
//!
//! ```text
//! Attempting --ok--------> Succeeded
//!     |------fatal-------> Failed
//!     |------retryable---> Backoff --elapsed--> Attempting
//!     '------retryable, budget spent---------> Exhausted
//! ```
//!
//! Transitions are pure so they can be exercised without a network.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};

use crate::Error;

/// Backoff configuration.
///
/// The delay before retry `n` (1-based) is `base_delay * multiplier^(n-1)`,
/// capped at `max_delay`, then scaled by a random factor in `[0.8, 1.2)` when
/// jitter is enabled (never exceeding `max_delay`).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Values below 1.0 are treated as 1.0.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computed backoff for the given retry number, before jitter.
    pub fn backoff(&self, retry: u32) -> Duration {
        let multiplier = if self.multiplier.is_finite() {
            self.multiplier.max(1.0)
        } else {
            1.0
        };
        let exponent = retry.saturating_sub(1).min(63) as i32;
        let millis = self.base_delay.as_millis() as f64 * multiplier.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }

    /// Delay to wait before retry `retry`. A server-supplied `Retry-After`
    /// replaces the computed backoff but is still bounded by `max_delay`.
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        if let Some(requested) = retry_after {
            return requested.min(self.max_delay);
        }
        let base = self.backoff(retry);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let factor = rand::thread_rng().gen_range(0.8..1.2);
        base.mul_f64(factor).min(self.max_delay)
    }
}

/// Where a call is in its retry lifecycle.
///
/// `attempt` counts HTTP attempts, starting at 1.
#[derive(Debug)]
pub enum RetryState<T> {
    Attempting { attempt: u32 },
    Backoff { attempt: u32, delay: Duration, last: Error },
    Succeeded { attempts: u32, value: T },
    Failed { attempts: u32, error: Error },
    Exhausted { attempts: u32, last: Error },
}

impl<T> RetryState<T> {
    pub fn start() -> Self {
        RetryState::Attempting { attempt: 1 }
    }

    /// Feeds the outcome of the current attempt into the machine.
    ///
    /// Only meaningful in `Attempting`; other states are returned unchanged.
    pub fn on_outcome(self, policy: &RetryPolicy, outcome: Result<T, Error>) -> Self {
        let attempt = match self {
            RetryState::Attempting { attempt } => attempt,
            other => return other,
        };
        match outcome {
            Ok(value) => RetryState::Succeeded {
                attempts: attempt,
                value,
            },
            Err(error) if !error.is_retryable() => RetryState::Failed {
                attempts: attempt,
                error,
            },
            Err(last) if attempt > policy.max_retries => RetryState::Exhausted {
                attempts: attempt,
                last,
            },
            Err(last) => RetryState::Backoff {
                attempt,
                delay: policy.delay_for(attempt, last.retry_after()),
                last,
            },
        }
    }

    /// Leaves `Backoff` once the delay has elapsed.
    pub fn on_backoff_elapsed(self) -> Self {
        match self {
            RetryState::Backoff { attempt, .. } => RetryState::Attempting {
                attempt: attempt + 1,
            },
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RetryState::Succeeded { .. } | RetryState::Failed { .. } | RetryState::Exhausted { .. }
        )
    }

    /// Converts a terminal state into the call's result.
    ///
    /// A non-terminal state here is a bug in the driver; it is reported as an
    /// error rather than a panic.
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            RetryState::Succeeded { value, .. } => Ok(value),
            RetryState::Failed { error, .. } => Err(error),
            RetryState::Exhausted { attempts, last } => Err(Error::RetriesExhausted {
                attempts,
                last: Box::new(last),
            }),
            RetryState::Attempting { .. } | RetryState::Backoff { .. } => Err(
                Error::InvalidRequest("retry state machine stopped before a result".into()),
            ),
        }
    }
}

/// Parses `Retry-After` as delta-seconds or an HTTP-date.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let when = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some(
        (when - Utc::now())
            .to_std()
            .unwrap_or(Duration::ZERO),
    )
}

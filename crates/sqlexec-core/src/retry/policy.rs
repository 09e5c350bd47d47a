use std::time::Duration;

use crate::bound::clamp;
use crate::config::RetryConfig;
use crate::retry::reason::NoRetryReason;

/// High-level classification of an error for retry purposes.
///
/// Callers map HTTP status codes, transport errors and server errors into
/// these kinds (see `classify`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, refused, ...).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Anything else: malformed request, authentication, SQL errors.
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop retrying for the given reason.
    NoRetry(NoRetryReason),
    /// Retry after the given (already bounded) delay.
    RetryAfter(Duration),
}

// Hard limits for user-supplied settings.
const ATTEMPTS_LIMITS: (u32, u32) = (1, 60);
const DURATION_LIMITS_SECS: (f64, f64) = (1.0, 86_400.0);
const DELAY_MIN_LIMITS_SECS: (f64, f64) = (1.0, 60.0);
const DELAY_MAX_LIMITS_SECS: (f64, f64) = (5.0, 3_600.0);
const DELAY_DEFAULT_LIMITS_SECS: (f64, f64) = (1.0, 60.0);

const MAX_BACKOFF_EXPONENT: u32 = 16;
const MAX_JITTER_MS: u64 = 1_000;

/// Exponential backoff with jitter, bounded by attempt and duration budgets.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Total time budget measured from the first attempt.
    pub max_duration: Duration,
    /// Lower bound on any backoff delay.
    pub delay_min: Duration,
    /// Upper bound on any backoff delay.
    pub delay_max: Duration,
    /// Base of the exponential backoff when the server gives no `Retry-After`.
    pub delay_default: Duration,
    /// Add up to one second of random delay to spread out retries.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            max_duration: Duration::from_secs(900),
            delay_min: Duration::from_secs(1),
            delay_max: Duration::from_secs(60),
            delay_default: Duration::from_secs(5),
            jitter: true,
        }
    }
}

fn bounded_secs(limits: (f64, f64), secs: f64) -> Duration {
    // NaN compares false both ways and would pass through clamp untouched.
    let secs = if secs.is_nan() { limits.0 } else { secs };
    Duration::from_secs_f64(clamp(Some(limits.0), Some(limits.1), secs))
}

impl RetryPolicy {
    /// Build a policy from config, pulling every value into its hard limits.
    pub fn from_config(cfg: &RetryConfig) -> Self {
        let delay_min = bounded_secs(DELAY_MIN_LIMITS_SECS, cfg.delay_min_secs);
        let delay_max = bounded_secs(DELAY_MAX_LIMITS_SECS, cfg.delay_max_secs).max(delay_min);
        Self {
            max_attempts: clamp(
                Some(ATTEMPTS_LIMITS.0),
                Some(ATTEMPTS_LIMITS.1),
                cfg.max_attempts,
            ),
            max_duration: bounded_secs(DURATION_LIMITS_SECS, cfg.max_duration_secs),
            delay_min,
            delay_max,
            delay_default: bounded_secs(DELAY_DEFAULT_LIMITS_SECS, cfg.delay_default_secs),
            jitter: cfg.jitter,
        }
    }

    /// Delay before the attempt following `attempt` (1-based), bounded to
    /// `[delay_min, delay_max]`.
    ///
    /// A server-provided `retry_after` replaces the exponential term.
    pub fn backoff_delay(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let raw = retry_after.unwrap_or_else(|| {
            let exp = attempt.saturating_sub(1).min(MAX_BACKOFF_EXPONENT);
            self.delay_default.saturating_mul(1u32 << exp)
        });
        let raw = if self.jitter {
            raw.saturating_add(Duration::from_millis(rand::random::<u64>() % MAX_JITTER_MS))
        } else {
            raw
        };
        clamp(Some(self.delay_min), Some(self.delay_max), raw)
    }

    /// Terminal classification of a failed attempt; `None` means retry.
    ///
    /// Checked in order: non-retryable error, attempt budget, time budget
    /// (would `elapsed + retry_delay` overrun `max_duration`).
    pub fn no_retry_reason(
        &self,
        kind: ErrorKind,
        attempt: u32,
        elapsed: Duration,
        retry_delay: Duration,
    ) -> Option<NoRetryReason> {
        if !kind.is_retryable() {
            return Some(NoRetryReason::NotRetryable);
        }
        if attempt >= self.max_attempts {
            return Some(NoRetryReason::OutOfAttempts);
        }
        if elapsed.saturating_add(retry_delay) > self.max_duration {
            return Some(NoRetryReason::OutOfTime);
        }
        None
    }

    /// Compute the bounded delay and decide whether to retry.
    pub fn decide(
        &self,
        kind: ErrorKind,
        attempt: u32,
        elapsed: Duration,
        retry_after: Option<Duration>,
    ) -> RetryDecision {
        let delay = self.backoff_delay(attempt, retry_after);
        match self.no_retry_reason(kind, attempt, elapsed, delay) {
            Some(reason) => RetryDecision::NoRetry(reason),
            None => RetryDecision::RetryAfter(delay),
        }
    }
}

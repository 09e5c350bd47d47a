use std::fmt;

/// Why the attempt loop stops. Absence means the request may still be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoRetryReason {
    OutOfTime,
    OutOfAttempts,
    NotRetryable,
}

impl NoRetryReason {
    pub fn label(self) -> &'static str {
        match self {
            NoRetryReason::OutOfTime => "out of time",
            NoRetryReason::OutOfAttempts => "out of attempts",
            NoRetryReason::NotRetryable => "non-retryable error",
        }
    }
}

impl fmt::Display for NoRetryReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

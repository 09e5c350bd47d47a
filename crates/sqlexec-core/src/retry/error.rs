//! Per-attempt failure and terminal execution error.

use std::time::Duration;

/// Error returned by a single request attempt (transport failure, HTTP error,
/// or an error reported by the server). Kept separate from `ExecutionError`
/// so the attempt loop can classify it before deciding to retry.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Socket-level failure (connection refused/reset, broken pipe, ...).
    #[error("transport: {0}")]
    Transport(#[from] std::io::Error),
    /// The request did not complete before its deadline.
    #[error("request timed out")]
    Timeout,
    /// Non-2xx HTTP response. `retry_after` is the server's `Retry-After`.
    #[error("HTTP {code}")]
    Http {
        code: u16,
        retry_after: Option<Duration>,
        message: Option<String>,
    },
    /// The server processed the request and reported an error (bad SQL,
    /// missing permission). Never retried.
    #[error("server error: {message}")]
    Server { message: String },
}

impl RequestError {
    pub fn http(code: u16) -> Self {
        RequestError::Http {
            code,
            retry_after: None,
            message: None,
        }
    }

    pub fn http_code(&self) -> Option<u16> {
        match self {
            RequestError::Http { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Delay the server asked for, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RequestError::Http { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Message from the server that is safe to show to a user.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Http { message, .. } => message.as_deref(),
            RequestError::Server { message } => Some(message),
            RequestError::Transport(_) | RequestError::Timeout => None,
        }
    }
}

/// Terminal failure of an execution's attempt loop.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// Retries stopped. `message` is the user-facing text; `context` is the
    /// diagnostic line of the last attempt.
    #[error("{message}")]
    RequestFailed {
        message: String,
        context: String,
        #[source]
        source: RequestError,
    },
    /// The owner cancelled the execution before or between attempts.
    #[error("execution cancelled after {attempts} attempt(s)")]
    Cancelled { attempts: u32 },
}

impl ExecutionError {
    /// User message followed by the operator-only diagnostic context.
    pub fn message_with_context(&self) -> String {
        match self {
            ExecutionError::RequestFailed {
                message, context, ..
            } => format!("{}: {}", message, context),
            ExecutionError::Cancelled { .. } => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    #[test]
    fn accessors_by_variant() {
        let e = RequestError::Http {
            code: 503,
            retry_after: Some(Duration::from_secs(4)),
            message: Some("warming up".into()),
        };
        assert_eq!(e.http_code(), Some(503));
        assert_eq!(e.retry_after(), Some(Duration::from_secs(4)));
        assert_eq!(e.server_message(), Some("warming up"));

        let t = RequestError::from(io::Error::from(io::ErrorKind::ConnectionReset));
        assert_eq!(t.http_code(), None);
        assert_eq!(t.server_message(), None);
        assert!(t.to_string().starts_with("transport: "));
    }

    #[test]
    fn request_failed_keeps_source_out_of_display() {
        let err = ExecutionError::RequestFailed {
            message: "Error during request to server".into(),
            context: "Method: FetchResults".into(),
            source: RequestError::Timeout,
        };
        assert_eq!(err.to_string(), "Error during request to server");
        assert_eq!(
            err.message_with_context(),
            "Error during request to server: Method: FetchResults"
        );
        assert_eq!(err.source().unwrap().to_string(), "request timed out");
    }
}

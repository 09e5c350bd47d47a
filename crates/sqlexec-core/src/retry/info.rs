//! Diagnostics of one failed attempt and its two text renderings.
//!
//! The diagnostic line is for operators and log scrapers: field names and
//! order are a compatibility contract. The user message is the only text that
//! may be surfaced to an end user; it never contains the raw error.

use std::fmt::Display;
use std::time::Duration;

use crate::handle::Guid;
use crate::retry::error::RequestError;
use crate::retry::reason::NoRetryReason;
use crate::retry::request::Request;

const USER_MESSAGE_BASE: &str = "Error during request to server";

/// One failed attempt, as seen by the attempt loop.
#[derive(Debug)]
pub struct RequestErrorInfo {
    pub error: RequestError,
    pub error_message: Option<String>,
    /// Bounded delay before the next attempt; `None` for non-retryable errors.
    pub retry_delay: Option<Duration>,
    pub http_code: Option<u16>,
    /// Name of the attempted operation (e.g. `ExecuteStatement`).
    pub method: String,
    pub request: Request,
}

fn or_none<T: Display>(v: Option<T>) -> String {
    v.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
}

fn secs(d: Duration) -> f64 {
    d.as_secs_f64()
}

impl RequestErrorInfo {
    /// Build from the raw error, taking the HTTP code and server message from it.
    pub fn new(error: RequestError, method: impl Into<String>, request: Request) -> Self {
        let http_code = error.http_code();
        let error_message = error.server_message().map(str::to_string);
        Self {
            error,
            error_message,
            retry_delay: None,
            http_code,
            method: method.into(),
            request,
        }
    }

    pub fn with_retry_delay(mut self, delay: Option<Duration>) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_error_message(mut self, message: Option<String>) -> Self {
        self.error_message = message;
        self
    }

    pub fn session_id(&self) -> Option<Guid> {
        self.request.session_id()
    }

    pub fn query_id(&self) -> Option<Guid> {
        self.request.query_id()
    }

    /// Ordered `(key, value)` pairs behind `render_diagnostic_line`.
    pub fn diagnostic_fields(
        &self,
        no_retry_reason: Option<NoRetryReason>,
        attempt: u32,
        max_attempts: u32,
        elapsed: Duration,
        max_duration: Duration,
    ) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("Method", self.method.clone()),
            ("Session-id", or_none(self.session_id())),
            ("Query-id", or_none(self.query_id())),
            ("HTTP-code", or_none(self.http_code)),
            ("Error-message", or_none(self.error_message.as_deref())),
            ("Original-exception", self.error.to_string()),
        ];
        match no_retry_reason {
            Some(reason) => fields.push(("No-retry-reason", reason.label().to_string())),
            None => {
                fields.push(("Bounded-retry-delay", or_none(self.retry_delay.map(secs))));
                fields.push(("Attempt", format!("{}/{}", attempt, max_attempts)));
                fields.push((
                    "Elapsed-seconds",
                    format!("{}/{}", secs(elapsed), secs(max_duration)),
                ));
            }
        }
        fields
    }

    /// Operator log line: `"Key: Value"` pairs joined by `"; "`.
    pub fn render_diagnostic_line(
        &self,
        no_retry_reason: Option<NoRetryReason>,
        attempt: u32,
        max_attempts: u32,
        elapsed: Duration,
        max_duration: Duration,
    ) -> String {
        self.diagnostic_fields(no_retry_reason, attempt, max_attempts, elapsed, max_duration)
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Message safe to return to an end user.
    pub fn render_user_message(
        &self,
        no_retry_reason: Option<NoRetryReason>,
        attempt: u32,
        elapsed: Duration,
    ) -> String {
        let mut msg = USER_MESSAGE_BASE.to_string();
        if let Some(m) = self.error_message.as_deref().filter(|m| !m.is_empty()) {
            msg.push_str(": ");
            msg.push_str(m);
        }
        match no_retry_reason {
            Some(NoRetryReason::OutOfAttempts) => msg.push_str(&format!(
                ": After {} retry attempts, retries are exhausted",
                attempt
            )),
            Some(NoRetryReason::OutOfTime) => msg.push_str(&format!(
                ": After {} seconds, maximum retry duration will be exceeded",
                secs(elapsed)
            )),
            Some(NoRetryReason::NotRetryable) | None => {}
        }
        msg
    }

    /// Give back the underlying error (e.g. as the source of a terminal error).
    pub fn into_error(self) -> RequestError {
        self.error
    }
}

//! Retry governance for requests to the SQL server.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures, server errors), bounded exponential backoff, the
//! terminal `NoRetryReason`, and the diagnostics of each failed attempt, so
//! every request path shares one policy and one log format.

mod classify;
mod error;
mod info;
mod policy;
mod reason;
mod request;
mod run;

pub use classify::{classify, classify_http_status, classify_io_error};
pub use error::{ExecutionError, RequestError};
pub use info::RequestErrorInfo;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use reason::NoRetryReason;
pub use request::Request;
pub use run::run_with_retry;

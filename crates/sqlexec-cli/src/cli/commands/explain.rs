//! `sqlexec explain` – render the operator line and the user message for a failure.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use sqlexec_core::config::ClientConfig;
use sqlexec_core::handle::Guid;
use sqlexec_core::retry::{classify, NoRetryReason, Request, RequestError, RequestErrorInfo};
use std::time::Duration;

use crate::cli::ReasonArg;

#[derive(Debug, Clone, Args)]
pub struct ExplainArgs {
    /// Name of the failed operation.
    #[arg(long, default_value = "ExecuteStatement")]
    pub method: String,
    /// Session the request was scoped to.
    #[arg(long, value_name = "GUID", conflicts_with = "operation")]
    pub session: Option<Guid>,
    /// Operation (query) the request was scoped to.
    #[arg(long, value_name = "GUID")]
    pub operation: Option<Guid>,
    /// HTTP status of the failure. Without it the failure is a server error
    /// when --message is given, a timeout otherwise.
    #[arg(long, value_name = "CODE")]
    pub http_code: Option<u16>,
    /// Message reported by the server.
    #[arg(long)]
    pub message: Option<String>,
    /// Terminal reason; omit to render a retrying attempt.
    #[arg(long, value_enum)]
    pub reason: Option<ReasonArg>,
    /// 1-based attempt number.
    #[arg(long, default_value = "1")]
    pub attempt: u32,
    /// Seconds elapsed since the first attempt.
    #[arg(long, default_value = "0")]
    pub elapsed: f64,
    /// Emit JSON instead of two text lines.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct Field {
    key: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
struct Explanation {
    retryable: bool,
    no_retry_reason: Option<&'static str>,
    fields: Vec<Field>,
    diagnostic_line: String,
    user_message: String,
}

fn request_error(args: &ExplainArgs) -> RequestError {
    match (args.http_code, &args.message) {
        (Some(code), message) => RequestError::Http {
            code,
            retry_after: None,
            message: message.clone(),
        },
        (None, Some(message)) => RequestError::Server {
            message: message.clone(),
        },
        (None, None) => RequestError::Timeout,
    }
}

fn request(args: &ExplainArgs) -> Request {
    match (args.session, args.operation) {
        (Some(s), _) => Request::session(s),
        (None, Some(o)) => Request::operation(o),
        (None, None) => Request::Plain,
    }
}

fn explain(cfg: &ClientConfig, args: &ExplainArgs) -> Result<Explanation> {
    let elapsed = match Duration::try_from_secs_f64(args.elapsed) {
        Ok(d) => d,
        Err(_) => bail!("--elapsed must be a non-negative number of seconds in range"),
    };
    let policy = cfg.retry_policy();
    let error = request_error(args);
    let retryable = classify(&error).is_retryable();
    let reason: Option<NoRetryReason> = match args.reason {
        Some(r) => Some(r.into()),
        None if !retryable => Some(NoRetryReason::NotRetryable),
        None => None,
    };
    let delay = retryable.then(|| policy.backoff_delay(args.attempt, error.retry_after()));

    let info =
        RequestErrorInfo::new(error, args.method.clone(), request(args)).with_retry_delay(delay);
    let fields = info
        .diagnostic_fields(
            reason,
            args.attempt,
            policy.max_attempts,
            elapsed,
            policy.max_duration,
        )
        .into_iter()
        .map(|(key, value)| Field { key, value })
        .collect();
    Ok(Explanation {
        retryable,
        no_retry_reason: reason.map(NoRetryReason::label),
        fields,
        diagnostic_line: info.render_diagnostic_line(
            reason,
            args.attempt,
            policy.max_attempts,
            elapsed,
            policy.max_duration,
        ),
        user_message: info.render_user_message(reason, args.attempt, elapsed),
    })
}

pub fn run_explain(cfg: &ClientConfig, args: &ExplainArgs) -> Result<()> {
    let e = explain(cfg, args)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&e)?);
    } else {
        println!("log:  {}", e.diagnostic_line);
        println!("user: {}", e.user_message);
    }
    Ok(())
}

//! Retry loop: run an attempt until success, a terminal failure, or cancel.

use std::future::Future;

use tokio::time::Instant;

use super::classify;
use super::error::{ExecutionError, RequestError};
use super::info::RequestErrorInfo;
use super::policy::RetryPolicy;
use super::request::Request;
use crate::control::CancelToken;

/// Runs `op` until it succeeds or the retry policy says to stop.
///
/// Attempts never overlap. On a retryable failure the diagnostic line is
/// logged and the loop sleeps for the bounded backoff; the sleep ends early
/// with `ExecutionError::Cancelled` if `cancel` fires. On a terminal failure
/// the user message is returned inside `ExecutionError::RequestFailed`.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    method: &str,
    request: &Request,
    cancel: &CancelToken,
    mut op: F,
) -> Result<T, ExecutionError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RequestError>>,
{
    let start = Instant::now();
    let mut attempt = 1u32;
    loop {
        if cancel.is_cancelled() {
            return Err(ExecutionError::Cancelled {
                attempts: attempt - 1,
            });
        }
        let err = match op().await {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        let elapsed = start.elapsed();
        let kind = classify::classify(&err);
        // Only retryable errors get a delay; it feeds both the decision and the log line.
        let delay = kind
            .is_retryable()
            .then(|| policy.backoff_delay(attempt, err.retry_after()));
        let reason = policy.no_retry_reason(kind, attempt, elapsed, delay.unwrap_or_default());

        let info = RequestErrorInfo::new(err, method, request.clone()).with_retry_delay(delay);
        let context = info.render_diagnostic_line(
            reason,
            attempt,
            policy.max_attempts,
            elapsed,
            policy.max_duration,
        );

        match (reason, delay) {
            (None, Some(delay)) => {
                tracing::info!("retrying request after error in {:?}: {}", delay, context);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = cancel.cancelled() => {
                        tracing::info!("request cancelled during backoff: {}", context);
                        return Err(ExecutionError::Cancelled { attempts: attempt });
                    }
                }
                attempt += 1;
            }
            (reason, _) => {
                let message = info.render_user_message(reason, attempt, elapsed);
                tracing::warn!("{}: {}", message, context);
                return Err(ExecutionError::RequestFailed {
                    message,
                    context,
                    source: info.into_error(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retry::NoRetryReason;
    use std::cell::Cell;
    use std::time::Duration;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 4,
            max_duration: Duration::from_secs(60),
            delay_min: Duration::from_secs(1),
            delay_max: Duration::from_secs(5),
            delay_default: Duration::from_secs(1),
            jitter: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Cell::new(0u32);
        let out = run_with_retry(
            &fast_policy(),
            "GetOperationStatus",
            &Request::Plain,
            &CancelToken::new(),
            || {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err(RequestError::http(503))
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await
        .unwrap();
        assert_eq!(out, 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_stops_after_one_attempt() {
        let calls = Cell::new(0u32);
        let err = run_with_retry(
            &fast_policy(),
            "ExecuteStatement",
            &Request::Plain,
            &CancelToken::new(),
            || {
                calls.set(calls.get() + 1);
                async {
                    Err::<(), _>(RequestError::Server {
                        message: "syntax error at or near SELEC".into(),
                    })
                }
            },
        )
        .await
        .unwrap_err();
        assert_eq!(calls.get(), 1);
        match err {
            ExecutionError::RequestFailed { message, context, .. } => {
                assert_eq!(
                    message,
                    "Error during request to server: syntax error at or near SELEC"
                );
                assert!(!context.contains("Bounded-retry-delay"));
                assert!(context.ends_with(&format!(
                    "No-retry-reason: {}",
                    NoRetryReason::NotRetryable.label()
                )));
            }
            other => panic!("expected RequestFailed, got {other:?}"),
        }
    }
}

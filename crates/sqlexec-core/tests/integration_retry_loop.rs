//! Integration test: the attempt loop against synthetic failing operations.
//!
//! Time is paused, so backoff sleeps advance the virtual clock instantly and
//! elapsed times in messages are exact.

use std::cell::Cell;
use std::time::Duration;

use sqlexec_core::control::{CancelToken, ExecutionControl};
use sqlexec_core::handle::Guid;
use sqlexec_core::retry::{run_with_retry, ExecutionError, Request, RequestError, RetryPolicy};
use tokio::time::Instant;

fn policy(max_attempts: u32, max_duration_secs: u64, delay_default_secs: u64) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        max_duration: Duration::from_secs(max_duration_secs),
        delay_min: Duration::from_secs(1),
        delay_max: Duration::from_secs(60),
        delay_default: Duration::from_secs(delay_default_secs),
        jitter: false,
    }
}

fn overloaded() -> RequestError {
    RequestError::Http {
        code: 503,
        retry_after: None,
        message: Some("timeout".into()),
    }
}

#[tokio::test(start_paused = true)]
async fn exhausts_attempts() {
    let calls = Cell::new(0u32);
    let session = Guid::random();
    let err = run_with_retry(
        &policy(3, 900, 1),
        "ExecuteStatement",
        &Request::session(session),
        &CancelToken::new(),
        || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(overloaded()) }
        },
    )
    .await
    .unwrap_err();

    assert_eq!(calls.get(), 3);
    match err {
        ExecutionError::RequestFailed {
            message, context, ..
        } => {
            assert_eq!(
                message,
                "Error during request to server: timeout: After 3 retry attempts, retries are exhausted"
            );
            assert!(context.starts_with(&format!(
                "Method: ExecuteStatement; Session-id: {}; Query-id: None; HTTP-code: 503",
                session
            )));
            assert!(context.ends_with("No-retry-reason: out of attempts"));
        }
        other => panic!("expected RequestFailed, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn stops_before_overrunning_duration() {
    let calls = Cell::new(0u32);
    let started = Instant::now();
    // Delays 4s then 8s; the second would end at 12s > 10s.
    let err = run_with_retry(
        &policy(30, 10, 4),
        "FetchResults",
        &Request::operation(Guid::random()),
        &CancelToken::new(),
        || {
            calls.set(calls.get() + 1);
            async { Err::<(), _>(RequestError::Timeout) }
        },
    )
    .await
    .unwrap_err();

    assert_eq!(calls.get(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(4));
    assert_eq!(
        err.to_string(),
        "Error during request to server: After 4 seconds, maximum retry duration will be exceeded"
    );
    assert!(err.message_with_context().ends_with("No-retry-reason: out of time"));
}

#[tokio::test(start_paused = true)]
async fn honours_server_retry_after() {
    let calls = Cell::new(0u32);
    let started = Instant::now();
    let value = run_with_retry(
        &policy(5, 900, 10),
        "GetOperationStatus",
        &Request::Plain,
        &CancelToken::new(),
        || {
            calls.set(calls.get() + 1);
            let first = calls.get() == 1;
            async move {
                if first {
                    Err(RequestError::Http {
                        code: 429,
                        retry_after: Some(Duration::from_secs(2)),
                        message: None,
                    })
                } else {
                    Ok("FINISHED")
                }
            }
        },
    )
    .await
    .unwrap();

    assert_eq!(value, "FINISHED");
    assert_eq!(calls.get(), 2);
    assert_eq!(started.elapsed(), Duration::from_secs(2));
}

#[tokio::test(start_paused = true)]
async fn cancel_interrupts_backoff() {
    let control = ExecutionControl::new();
    let token = control.register(7);
    let started = Instant::now();
    let slow = policy(30, 900, 30);

    let run = run_with_retry(
        &slow,
        "ExecuteStatement",
        &Request::Plain,
        &token,
        || async { Err::<(), _>(overloaded()) },
    );
    let canceller = async {
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(control.request_cancel(7));
    };
    let (result, ()) = tokio::join!(run, canceller);

    assert!(matches!(
        result,
        Err(ExecutionError::Cancelled { attempts: 1 })
    ));
    assert!(started.elapsed() < Duration::from_secs(30));
    control.unregister(7);
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_makes_no_attempt() {
    let token = CancelToken::new();
    token.cancel();
    let calls = Cell::new(0u32);
    let result = run_with_retry(
        &policy(3, 900, 1),
        "CloseSession",
        &Request::Plain,
        &token,
        || {
            calls.set(calls.get() + 1);
            async { Ok::<_, RequestError>(()) }
        },
    )
    .await;
    assert!(matches!(result, Err(ExecutionError::Cancelled { attempts: 0 })));
    assert_eq!(calls.get(), 0);
}

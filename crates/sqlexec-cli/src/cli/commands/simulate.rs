//! `sqlexec simulate` – drive the attempt loop against a synthetic operation.
//!
//! Useful for checking a config's retry budget end to end: every attempt is
//! logged with its diagnostic line, and Ctrl-C cancels the current backoff.
//! The successful attempt returns a synthetic result of `rows` rows, which is
//! then drained in slices of the configured `arraysize`.

use anyhow::{bail, Context, Result};
use arrow::array::Int64Array;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use sqlexec_core::config::ClientConfig;
use sqlexec_core::control::CancelToken;
use sqlexec_core::cursor::ResultCursor;
use sqlexec_core::execute::{ExecutionResult, ExecutionStatus};
use sqlexec_core::handle::{CommandHandle, Guid};
use sqlexec_core::retry::{run_with_retry, ExecutionError, Request, RequestError};
use std::cell::Cell;
use std::sync::Arc;

/// Single `row_id bigint` column holding `0..rows`.
fn synthetic_batch(rows: usize) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![Field::new("row_id", DataType::Int64, false)]));
    let ids = Int64Array::from_iter_values((0..rows).map(|i| i as i64));
    RecordBatch::try_new(schema, vec![Arc::new(ids)]).context("building synthetic result")
}

/// Drain the result's cursor `arraysize` rows at a time; returns the slice sizes.
fn drain_result(result: ExecutionResult, arraysize: usize) -> Result<Vec<usize>> {
    if arraysize == 0 {
        bail!("arraysize must be at least 1");
    }
    let Some(mut cursor) = result.into_cursor() else {
        return Ok(Vec::new());
    };
    Ok(cursor.batches(arraysize).map(|b| b.num_rows()).collect())
}

pub async fn run_simulate(
    cfg: &ClientConfig,
    failures: u32,
    http_code: u16,
    method: &str,
    rows: usize,
) -> Result<()> {
    if (200..300).contains(&http_code) {
        bail!("--http-code must be an error status, got {}", http_code);
    }
    let policy = cfg.retry_policy();
    let session = Guid::random();
    let request = Request::session(session);
    let batch = synthetic_batch(rows)?;

    let cancel = CancelToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });

    println!(
        "simulating {} failure(s) of {} (HTTP {}) in session {}",
        failures, method, http_code, session
    );
    let attempts = Cell::new(0u32);
    let outcome = run_with_retry(&policy, method, &request, &cancel, || {
        attempts.set(attempts.get() + 1);
        let fail = attempts.get() <= failures;
        let batch = batch.clone();
        async move {
            if fail {
                Err(RequestError::http(http_code))
            } else {
                let handle = CommandHandle::new(Guid::random(), true);
                Ok(ExecutionResult::new(ExecutionStatus::Finished, handle)
                    .with_cursor(ResultCursor::from_batch(batch)))
            }
        }
    })
    .await;
    ctrl_c.abort();

    match outcome {
        Ok(result) => {
            println!("succeeded after {} attempt(s)", attempts.get());
            let slices = drain_result(result, cfg.arraysize)?;
            println!(
                "fetched {} row(s) in {} batch(es) of up to {}",
                slices.iter().sum::<usize>(),
                slices.len(),
                cfg.arraysize
            );
            Ok(())
        }
        Err(e @ ExecutionError::Cancelled { .. }) => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => {
            tracing::debug!("simulation failed: {}", e.message_with_context());
            eprintln!("{}", e.message_with_context());
            Err(e.into())
        }
    }
}

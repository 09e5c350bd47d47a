//! Execution control for cancellation: shared cancel tokens and a registry.
//!
//! Each running execution gets a `CancelToken`. The attempt loop checks it
//! before each attempt and races it against the backoff sleep, so a cancel
//! ends the execution without waiting out the delay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Notify;

/// Identifier of a running execution within one `ExecutionControl`.
pub type ExecutionId = u64;

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cloneable cancellation flag with an async wait.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<TokenState>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolves once `cancel` has been called (immediately if it already was).
    pub async fn cancelled(&self) {
        loop {
            // Register before checking the flag so a concurrent cancel is not missed.
            let notified = self.inner.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Shared registry of execution id -> cancel token. The owner of an execution
/// registers it; anyone holding the registry can request its cancellation.
#[derive(Debug, Default)]
pub struct ExecutionControl {
    executions: RwLock<HashMap<ExecutionId, CancelToken>>,
}

impl ExecutionControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running execution; returns the token to pass to the attempt loop.
    pub fn register(&self, id: ExecutionId) -> CancelToken {
        let token = CancelToken::new();
        self.executions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, token.clone());
        token
    }

    /// Unregister an execution (call when it finishes, success or failure).
    pub fn unregister(&self, id: ExecutionId) {
        self.executions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&id);
    }

    /// Cancel a registered execution. Returns false if the id is unknown.
    pub fn request_cancel(&self, id: ExecutionId) -> bool {
        match self
            .executions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
        {
            Some(token) => {
                tracing::info!(execution = id, "cancel requested");
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Ids of currently registered executions, sorted.
    pub fn running(&self) -> Vec<ExecutionId> {
        let mut ids: Vec<_> = self
            .executions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }
}

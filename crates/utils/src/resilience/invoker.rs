//! Deadline-bounded, panic-isolated execution of remote calls.
//!
//! [`ResilientInvoker::invoke`] spawns the call on its own tokio task and
//! races the task's completion channel against a deadline. A panic inside
//! the call is caught on the task and delivered as [`Error::Internal`] over
//! the same channel. When the deadline wins, the caller gets
//! [`Error::Timeout`] immediately and the task is left to finish on its own;
//! its result is dropped.

use bastion_core::{Error, Result};
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::oneshot;

/// Runs remote calls on isolated tasks with a hard wait ceiling
#[derive(Debug, Clone)]
pub struct ResilientInvoker {
    operation: String,
    default_timeout: Duration,
}

impl ResilientInvoker {
    /// Create an invoker for the named operation
    pub fn new(operation: impl Into<String>, default_timeout: Duration) -> Self {
        Self {
            operation: operation.into(),
            default_timeout,
        }
    }

    /// Operation label used in errors and logs
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Deadline used by [`invoke_default`](Self::invoke_default)
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `call` with the default deadline
    pub async fn invoke_default<F, Fut, T>(&self, call: F) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        self.invoke(call, self.default_timeout).await
    }

    /// Run `call` on a separate task and wait at most `timeout` for it
    pub async fn invoke<F, Fut, T>(&self, call: F, timeout: Duration) -> Result<T>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let operation = self.operation.clone();

        tokio::spawn(async move {
            let outcome = match AssertUnwindSafe(async move { call().await })
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::error!(operation = %operation, panic = %message, "remote call panicked");
                    Err(Error::internal(format!("'{operation}' panicked: {message}")))
                }
            };
            // The receiver is gone if the deadline already fired
            let _ = tx.send(outcome);
        });

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(Error::internal(format!(
                "'{}' task ended without a result",
                self.operation
            ))),
            Err(_) => {
                tracing::warn!(
                    operation = %self.operation,
                    timeout_ms = timeout.as_millis() as u64,
                    "remote call exceeded its deadline"
                );
                Err(Error::timeout(self.operation.clone(), timeout))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_returns_result() {
        let invoker = ResilientInvoker::new("validate", Duration::from_secs(1));
        let value = invoker.invoke_default(|| async { Ok(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_propagates_errors_unchanged() {
        let invoker = ResilientInvoker::new("validate", Duration::from_secs(1));
        let result: Result<()> = invoker
            .invoke_default(|| async { Err(Error::network("idp", "refused")) })
            .await;
        assert!(matches!(result, Err(Error::Network { .. })));
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let invoker = ResilientInvoker::new("validate", Duration::from_secs(1));
        let result: Result<()> = invoker
            .invoke_default(|| async { panic!("decoder blew up") })
            .await;

        match result {
            Err(Error::Internal { message }) => assert!(message.contains("decoder blew up")),
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_returns_timeout_without_cancelling() {
        let invoker = ResilientInvoker::new("validate", Duration::from_millis(50));
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result: Result<()> = invoker
            .invoke_default(move || async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert!(matches!(result, Err(Error::Timeout { .. })));
        assert!(!finished.load(Ordering::SeqCst));

        // The abandoned task still runs to completion
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(finished.load(Ordering::SeqCst));
    }
}

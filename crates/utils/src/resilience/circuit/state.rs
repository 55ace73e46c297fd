//! Circuit breaker state management and execution logic.

use super::config::CircuitBreakerConfig;
use super::metrics::MetricsState;
use super::transitions::StateTransitions;
use super::types::{CircuitBreakerStats, CircuitState};
use bastion_core::{Error, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;

/// Circuit breaker implementation
///
/// One instance guards one remote dependency for the lifetime of the hosting
/// service; share it behind an `Arc`.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    metrics: Arc<MetricsState>,
    transitions: StateTransitions,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let metrics = Arc::new(MetricsState::new());
        let transitions = StateTransitions::new(config.clone(), Arc::clone(&metrics));

        Self {
            config,
            metrics,
            transitions,
        }
    }

    /// Name of the protected dependency
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Configuration this breaker was built with
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Get the current state of the circuit
    ///
    /// An open circuit whose reset timeout has elapsed is reported as
    /// half-open: the next call will be let through. Inspection never
    /// mutates the breaker.
    pub async fn state(&self) -> CircuitState {
        let inner = self.metrics.inner.read().await;
        if inner.state == CircuitState::Open && inner.reset_elapsed(&self.config, Instant::now()) {
            return CircuitState::HalfOpen;
        }
        inner.state
    }

    /// Current number of recorded failures
    pub async fn failure_count(&self) -> usize {
        self.metrics.inner.read().await.failure_count
    }

    /// Execute an operation through the circuit breaker
    ///
    /// Client errors (malformed request, authentication failure, denial) mean
    /// the dependency answered, so they count as a successful round trip.
    pub async fn call<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let Some(generation) = self.transitions.admit().await else {
            self.metrics.record_rejection();
            tracing::debug!(dependency = %self.config.name, "call rejected by open circuit");
            return Err(Error::circuit_open(self.config.name.clone()));
        };

        self.metrics.record_call();
        let result = operation().await;

        match &result {
            Err(error) if !error.is_client_error() => {
                self.transitions.record_failure(generation).await;
            }
            _ => {
                self.transitions.record_success(generation).await;
            }
        }

        result
    }

    /// Get current circuit breaker statistics
    pub async fn stats(&self) -> CircuitBreakerStats {
        self.metrics.stats(self.config.failure_limit).await
    }

    /// Close the circuit and forget all failures
    pub async fn reset(&self) {
        self.transitions.reset().await;
    }
}

//! Lock-guarded state and call counters for a circuit breaker.

use super::types::{CircuitBreakerStats, CircuitState};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tokio::time::Instant;

/// Mutable breaker state, only ever touched under [`MetricsState::inner`]
#[derive(Debug, Clone)]
pub struct BreakerState {
    pub state: CircuitState,
    pub failure_count: usize,
    pub last_failure_time: Option<Instant>,
    pub last_state_change: Instant,
    /// Bumped on every transition; results of calls admitted under an older
    /// generation are not recorded.
    pub generation: u64,
}

impl BreakerState {
    /// Fresh, closed state
    pub fn new() -> Self {
        Self {
            state: CircuitState::Closed,
            failure_count: 0,
            last_failure_time: None,
            last_state_change: Instant::now(),
            generation: 0,
        }
    }
}

impl Default for BreakerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal state tracking for circuit breaker metrics
#[derive(Debug)]
pub struct MetricsState {
    pub inner: RwLock<BreakerState>,
    pub total_calls: AtomicU64,
    pub rejected_calls: AtomicU64,
}

impl MetricsState {
    /// Create new metrics state
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(BreakerState::new()),
            total_calls: AtomicU64::new(0),
            rejected_calls: AtomicU64::new(0),
        }
    }

    /// Count a call that reached the operation
    pub fn record_call(&self) {
        self.total_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a call rejected by an open circuit
    pub fn record_rejection(&self) {
        self.rejected_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current circuit breaker statistics
    pub async fn stats(&self, failure_limit: usize) -> CircuitBreakerStats {
        let inner = self.inner.read().await;
        CircuitBreakerStats {
            state: inner.state,
            failure_count: inner.failure_count,
            failure_limit,
            last_failure_time: inner.last_failure_time,
            last_state_change: inner.last_state_change,
            total_calls: self.total_calls.load(Ordering::Relaxed),
            rejected_calls: self.rejected_calls.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

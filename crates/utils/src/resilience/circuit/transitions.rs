//! State transition logic for circuit breaker.

use super::config::CircuitBreakerConfig;
use super::metrics::{BreakerState, MetricsState};
use super::types::CircuitState;
use std::sync::Arc;
use tokio::time::Instant;

impl BreakerState {
    /// Whether an open circuit has waited long enough for a probe
    pub fn reset_elapsed(&self, config: &CircuitBreakerConfig, now: Instant) -> bool {
        match self.last_failure_time {
            Some(last) => now.saturating_duration_since(last) > config.reset_timeout,
            None => true,
        }
    }

    fn enter(&mut self, state: CircuitState, now: Instant) {
        self.state = state;
        self.last_state_change = now;
        self.generation += 1;
    }

    /// Transition to open state
    pub fn transition_to_open(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        if self.state != CircuitState::Open {
            log::warn!(
                "Circuit breaker for '{}' opening after {} failure(s)",
                config.name,
                self.failure_count
            );
            self.enter(CircuitState::Open, now);
        }
    }

    /// Transition to half-open state, forgetting previous failures
    pub fn transition_to_half_open(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        if self.state != CircuitState::HalfOpen {
            log::info!(
                "Circuit breaker for '{}' entering half-open state",
                config.name
            );
            self.failure_count = 0;
            self.enter(CircuitState::HalfOpen, now);
        }
    }

    /// Transition to closed state
    pub fn transition_to_closed(&mut self, config: &CircuitBreakerConfig, now: Instant) {
        if self.state != CircuitState::Closed {
            log::info!("Circuit breaker for '{}' closing", config.name);
            self.failure_count = 0;
            self.enter(CircuitState::Closed, now);
        }
    }

    /// Apply a successful call admitted under `generation`
    pub fn apply_success(&mut self, config: &CircuitBreakerConfig, generation: u64, now: Instant) {
        if generation != self.generation {
            return;
        }
        match self.state {
            CircuitState::HalfOpen => self.transition_to_closed(config, now),
            CircuitState::Closed => self.failure_count = 0,
            CircuitState::Open => {}
        }
    }

    /// Apply a failed call admitted under `generation`
    pub fn apply_failure(&mut self, config: &CircuitBreakerConfig, generation: u64, now: Instant) {
        if generation != self.generation {
            return;
        }
        self.failure_count += 1;
        self.last_failure_time = Some(now);
        match self.state {
            CircuitState::Closed => {
                if self.failure_count >= config.failure_limit {
                    self.transition_to_open(config, now);
                }
            }
            // Any failure while probing re-opens the circuit
            CircuitState::HalfOpen => self.transition_to_open(config, now),
            CircuitState::Open => {}
        }
    }
}

/// Handles state transitions for circuit breaker
#[derive(Debug)]
pub struct StateTransitions {
    config: CircuitBreakerConfig,
    metrics: Arc<MetricsState>,
}

impl StateTransitions {
    /// Create new state transitions handler
    pub fn new(config: CircuitBreakerConfig, metrics: Arc<MetricsState>) -> Self {
        Self { config, metrics }
    }

    /// Decide whether a call may proceed.
    ///
    /// Returns the generation the call is admitted under, or `None` when the
    /// circuit is open and the reset timeout has not yet elapsed. An open
    /// circuit whose timeout has elapsed moves to half-open here.
    pub async fn admit(&self) -> Option<u64> {
        {
            let inner = self.metrics.inner.read().await;
            match inner.state {
                CircuitState::Closed | CircuitState::HalfOpen => return Some(inner.generation),
                CircuitState::Open if !inner.reset_elapsed(&self.config, Instant::now()) => {
                    return None;
                }
                CircuitState::Open => {}
            }
        }

        // Re-check under the write lock, another caller may have moved first
        let mut inner = self.metrics.inner.write().await;
        let now = Instant::now();
        if inner.state == CircuitState::Open {
            if !inner.reset_elapsed(&self.config, now) {
                return None;
            }
            inner.transition_to_half_open(&self.config, now);
        }
        Some(inner.generation)
    }

    /// Record a successful call and handle state transitions
    pub async fn record_success(&self, generation: u64) {
        let mut inner = self.metrics.inner.write().await;
        inner.apply_success(&self.config, generation, Instant::now());
    }

    /// Record a failed call and handle state transitions
    pub async fn record_failure(&self, generation: u64) {
        let mut inner = self.metrics.inner.write().await;
        inner.apply_failure(&self.config, generation, Instant::now());
    }

    /// Force the breaker back to a fresh closed state
    pub async fn reset(&self) {
        let mut inner = self.metrics.inner.write().await;
        inner.transition_to_closed(&self.config, Instant::now());
        inner.last_failure_time = None;
    }
}

//! Configuration for circuit breaker behavior.

use bastion_core::constants::{DEFAULT_FAILURE_LIMIT, DEFAULT_RESET_TIMEOUT_SECS};
use std::time::Duration;

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Name of the protected dependency, used in errors and logs
    pub name: String,
    /// Number of failures before opening the circuit
    pub failure_limit: usize,
    /// Time since the last failure before a half-open probe is allowed
    pub reset_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            name: "remote".to_string(),
            failure_limit: DEFAULT_FAILURE_LIMIT,
            reset_timeout: Duration::from_secs(DEFAULT_RESET_TIMEOUT_SECS),
        }
    }
}

impl CircuitBreakerConfig {
    /// Default configuration for the named dependency
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the failure limit (clamped to at least one)
    #[must_use]
    pub fn with_failure_limit(mut self, failure_limit: usize) -> Self {
        self.failure_limit = failure_limit.max(1);
        self
    }

    /// Set the reset timeout
    #[must_use]
    pub fn with_reset_timeout(mut self, reset_timeout: Duration) -> Self {
        self.reset_timeout = reset_timeout;
        self
    }
}

//! Health surface of the authorization layer

use bastion_utils::resilience::CircuitState;
use serde::Serialize;
use std::fmt;

/// Coarse health summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Degraded => write!(f, "degraded"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
        }
    }
}

/// Snapshot exposed to external health-check aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthHealth {
    /// Whether requests are currently being authorized
    pub auth_enabled: bool,
    /// Authorization was switched off because the validator was unreachable
    pub degraded: bool,
    pub breaker_state: CircuitState,
    pub failure_count: usize,
    pub cache_entries: usize,
}

impl AuthHealth {
    /// Degraded mode and an open breaker both leave callers exposed or refused
    pub fn status(&self) -> HealthStatus {
        if self.degraded {
            HealthStatus::Degraded
        } else if self.breaker_state == CircuitState::Open {
            HealthStatus::Unhealthy
        } else if self.breaker_state == CircuitState::HalfOpen || self.failure_count > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

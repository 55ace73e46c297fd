//! The `AuthConfig` struct and its validation
//!
//! The configuration is immutable once loaded and is shared by the
//! middleware, the circuit breaker and the permission cache.

use bastion_core::constants::{
    DEFAULT_CACHE_TTL_SECS, DEFAULT_CALL_TIMEOUT_MS, DEFAULT_FAILURE_LIMIT,
    DEFAULT_HEALTH_TIMEOUT_MS, DEFAULT_IDENTITY_ENDPOINT, DEFAULT_NEGATIVE_CACHE_TTL_SECS,
    DEFAULT_RESET_TIMEOUT_SECS,
};
use bastion_core::{Error, Result};
use bastion_utils::resilience::CircuitBreakerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the authorization middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Address of the identity/validator service
    pub identity_endpoint: String,

    /// Whether authorization is enforced at all
    pub enabled: bool,

    /// Deadline for validation and other administrative calls
    #[serde(with = "duration_ms", rename = "call_timeout_ms")]
    pub call_timeout: Duration,

    /// Deadline for health-style calls, including the startup probe
    #[serde(with = "duration_ms", rename = "health_timeout_ms")]
    pub health_timeout: Duration,

    /// Lifetime of a cached principal
    #[serde(with = "duration_ms", rename = "cache_ttl_ms")]
    pub cache_ttl: Duration,

    /// Lifetime of a cached unknown-principal marker; zero disables it
    #[serde(with = "duration_ms", rename = "negative_cache_ttl_ms")]
    pub negative_cache_ttl: Duration,

    /// Consecutive failures before the validator circuit opens
    pub failure_limit: usize,

    /// Time after the last failure before the circuit lets a probe through
    #[serde(with = "duration_ms", rename = "reset_timeout_ms")]
    pub reset_timeout: Duration,

    /// Keep serving with authorization disabled when the validator is
    /// unreachable at startup
    pub degrade_on_startup_failure: bool,

    /// Identifier of the service hosting this middleware
    pub service_name: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            identity_endpoint: DEFAULT_IDENTITY_ENDPOINT.to_string(),
            enabled: true,
            call_timeout: Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS),
            health_timeout: Duration::from_millis(DEFAULT_HEALTH_TIMEOUT_MS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            negative_cache_ttl: Duration::from_secs(DEFAULT_NEGATIVE_CACHE_TTL_SECS),
            failure_limit: DEFAULT_FAILURE_LIMIT,
            reset_timeout: Duration::from_secs(DEFAULT_RESET_TIMEOUT_SECS),
            degrade_on_startup_failure: true,
            service_name: None,
        }
    }
}

/// Lifetimes used by the permission cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub negative_ttl: Duration,
}

impl Default for CacheSettings {
    fn default() -> Self {
        let config = AuthConfig::default();
        config.cache_config()
    }
}

impl AuthConfig {
    /// Check invariants that the rest of the system relies on
    pub fn validate(&self) -> Result<()> {
        if self.identity_endpoint.trim().is_empty() {
            return Err(Error::validation("identity_endpoint", "must not be empty"));
        }
        if self.call_timeout.is_zero() {
            return Err(Error::validation("call_timeout", "must be greater than zero"));
        }
        if self.health_timeout.is_zero() {
            return Err(Error::validation("health_timeout", "must be greater than zero"));
        }
        if self.cache_ttl.is_zero() {
            return Err(Error::validation("cache_ttl", "must be greater than zero"));
        }
        if self.failure_limit == 0 {
            return Err(Error::validation("failure_limit", "must be at least 1"));
        }
        if self.reset_timeout.is_zero() {
            return Err(Error::validation("reset_timeout", "must be greater than zero"));
        }
        if let Some(name) = &self.service_name {
            if name.trim().is_empty() {
                return Err(Error::validation("service_name", "must not be blank"));
            }
        }
        Ok(())
    }

    /// Circuit breaker settings for the validator dependency
    pub fn breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::new(self.identity_endpoint.clone())
            .with_failure_limit(self.failure_limit)
            .with_reset_timeout(self.reset_timeout)
    }

    /// Permission cache lifetimes
    pub fn cache_config(&self) -> CacheSettings {
        CacheSettings {
            ttl: self.cache_ttl,
            negative_ttl: self.negative_cache_ttl,
        }
    }
}

/// Serialize durations as integer milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

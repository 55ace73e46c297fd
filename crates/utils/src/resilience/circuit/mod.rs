//! Circuit breaker for calls to remote dependencies
//!
//! A breaker starts `Closed`. Every failed call increments the failure count;
//! once the count reaches the configured limit the breaker opens and rejects
//! calls immediately, without invoking the operation. When the reset timeout
//! has elapsed since the last failure, the next call moves the breaker to
//! `HalfOpen` and is let through: a success closes the breaker again, a
//! failure re-opens it.
//!
//! ## Architecture
//!
//! - [`types`] - Core types (CircuitState, CircuitBreakerStats)
//! - [`config`] - Failure limit and reset timeout
//! - [`metrics`] - Lock-guarded breaker state and call counters
//! - [`transitions`] - State transition logic
//! - [`state`] - The [`CircuitBreaker`] itself
//!
//! ## Example
//!
//! ```rust,no_run
//! use bastion_utils::resilience::circuit::{CircuitBreaker, CircuitBreakerConfig};
//!
//! # async fn example() -> Result<String, bastion_core::Error> {
//! let cb = CircuitBreaker::new(CircuitBreakerConfig::new("identity"));
//!
//! let result = cb.call(|| async {
//!     // Your remote call here
//!     Ok("success".to_string())
//! }).await;
//! result
//! # }
//! ```

pub mod config;
pub mod metrics;
pub mod state;
#[cfg(test)]
pub mod tests;
pub mod transitions;
pub mod types;

pub use config::CircuitBreakerConfig;
pub use state::CircuitBreaker;
pub use types::{CircuitBreakerStats, CircuitState};

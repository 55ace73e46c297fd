//! Resilience patterns for remote calls.
//!
//! ## Key Components
//!
//! - **`circuit`**: Implements the circuit breaker pattern to stop calling a
//!   dependency that is known to be failing.
//! - **`invoker`**: Runs a remote call on an isolated task, bounded by a
//!   deadline, converting panics into errors.
//! - **`status`**: Polls the health of named services through one breaker per
//!   service.

pub mod circuit;
pub mod invoker;
pub mod status;

pub use circuit::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerStats, CircuitState};
pub use invoker::ResilientInvoker;
pub use status::{ServicePoller, ServiceStatus, StatusProbe};

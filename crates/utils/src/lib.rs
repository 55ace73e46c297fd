//! Shared resilience primitives and tracing setup for bastion
//!
//! Everything that talks to a remote dependency goes through the types in
//! [`resilience`]: a [`CircuitBreaker`] per dependency and a
//! [`ResilientInvoker`] that bounds every call with a deadline and isolates
//! panics on a separate task.

pub mod resilience;
pub mod telemetry;

pub use resilience::*;

//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRequest { operation, message } => {
                write!(f, "malformed request for '{operation}': {message}")
            }
            Error::Authentication { message } => {
                write!(f, "authentication failed: {message}")
            }
            Error::PermissionDenied { operation, scope } => {
                if scope.is_empty() {
                    write!(f, "permission denied for '{operation}'")
                } else {
                    write!(f, "permission denied for '{operation}' on scope '{scope}'")
                }
            }
            Error::CircuitOpen { dependency } => {
                write!(f, "circuit breaker is open for '{dependency}': service unavailable")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
            Error::Network { endpoint, message } => {
                write!(f, "network error for '{endpoint}': {message}")
            }
            Error::Internal { message } => {
                write!(f, "internal fault: {message}")
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Validation { field, message } => {
                write!(f, "validation failed for '{field}': {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Json { message, .. } => {
                write!(f, "JSON error: {message}")
            }
        }
    }
}

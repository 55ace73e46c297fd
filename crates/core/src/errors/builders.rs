//! Builder methods for creating errors with context

use super::types::Error;
use std::path::PathBuf;
use std::time::Duration;

// Helper methods for creating errors with context
impl Error {
    /// Create a malformed request error
    #[must_use]
    pub fn malformed_request(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::MalformedRequest {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an authentication failure
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Error::Authentication {
            message: message.into(),
        }
    }

    /// Create a permission denied error
    #[must_use]
    pub fn permission_denied(operation: impl Into<String>, scope: impl Into<String>) -> Self {
        Error::PermissionDenied {
            operation: operation.into(),
            scope: scope.into(),
        }
    }

    /// Create a circuit open error
    #[must_use]
    pub fn circuit_open(dependency: impl Into<String>) -> Self {
        Error::CircuitOpen {
            dependency: dependency.into(),
        }
    }

    /// Create a timeout error
    #[must_use]
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Error::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a network error
    #[must_use]
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Network {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create an internal fault error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a validation error for a named field
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a file system error with context
    #[must_use]
    pub fn file_system(
        path: impl Into<PathBuf>,
        operation: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        Error::FileSystem {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }
}

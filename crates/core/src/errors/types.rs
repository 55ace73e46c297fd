//! Core error type definitions

use std::path::PathBuf;
use std::time::Duration;

/// Result type alias for bastion operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for bastion operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Request rejected before any remote call (missing credential or scope)
    MalformedRequest { operation: String, message: String },

    /// The validator reported the credential as invalid or expired
    Authentication { message: String },

    /// Authentic principal, but no access pattern matched
    PermissionDenied { operation: String, scope: String },

    /// The circuit breaker for a remote dependency is open
    CircuitOpen { dependency: String },

    /// Operation timeout errors
    Timeout { operation: String, duration: Duration },

    /// Network-related errors
    Network { endpoint: String, message: String },

    /// A panic caught at a task boundary
    Internal { message: String },

    /// Configuration errors
    Configuration { message: String },

    /// Field-level validation errors
    Validation { field: String, message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization errors
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Coarse classification of an [`Error`], used to shape denial responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing credential, missing scope or undecodable message
    MalformedRequest,
    /// Credential is not valid
    Unauthenticated,
    /// Principal is valid but not allowed
    Forbidden,
    /// A remote dependency could not be consulted
    Unavailable,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// Stable wire name of this kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MalformedRequest => "malformed_request",
            ErrorKind::Unauthenticated => "unauthenticated",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl Error {
    /// Classify this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MalformedRequest { .. } | Error::Json { .. } => ErrorKind::MalformedRequest,
            Error::Authentication { .. } => ErrorKind::Unauthenticated,
            Error::PermissionDenied { .. } => ErrorKind::Forbidden,
            Error::CircuitOpen { .. }
            | Error::Timeout { .. }
            | Error::Network { .. }
            | Error::Internal { .. } => ErrorKind::Unavailable,
            Error::Configuration { .. } | Error::Validation { .. } | Error::FileSystem { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Errors caused by the caller; never counted against a circuit breaker
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::MalformedRequest | ErrorKind::Unauthenticated | ErrorKind::Forbidden
        )
    }

    /// Errors caused by an unreachable, slow or crashing remote dependency
    #[must_use]
    pub fn is_dependency_failure(&self) -> bool {
        self.kind() == ErrorKind::Unavailable
    }
}

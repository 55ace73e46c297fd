//! Conversion implementations for error types

use super::types::Error;

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Json {
            message: error.to_string(),
            source: error,
        }
    }
}

// The cause chain is flattened into the message.
impl From<anyhow::Error> for Error {
    fn from(error: anyhow::Error) -> Self {
        Error::Internal {
            message: format!("{error:#}"),
        }
    }
}

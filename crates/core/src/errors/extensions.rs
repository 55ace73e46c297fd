//! Extension traits for error handling

use super::types::{Error, ErrorKind, Result};

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to a Result.
    ///
    /// Classified errors (client errors and dependency failures) pass through
    /// untouched so that callers can still tell them apart; everything else
    /// becomes a configuration error prefixed with `message`.
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let base_error = e.into();
            if base_error.kind() != ErrorKind::Internal {
                return base_error;
            }
            Error::Configuration {
                message: format!("{}: {}", message.into(), base_error),
            }
        })
    }
}

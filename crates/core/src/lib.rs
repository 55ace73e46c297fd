//! Core errors and constants for the `bastion` authorization layer.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias,
//!   centralizing every failure mode of the authorization path (malformed
//!   request, authentication failure, denial, dependency failure, internal
//!   fault) so that callers can classify them without string matching.
//! - **`constants`**: Shared static constants such as environment variable
//!   names and default timeouts.

pub mod constants;
pub mod errors;

pub use self::{
    constants::*,
    errors::{Error, ErrorKind, Result, ResultExt},
};

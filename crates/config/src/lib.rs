//! Configuration for the bastion authorization layer
//!
//! Settings are resolved in three layers: built-in defaults, an optional JSON
//! config file, then `BASTION_*` environment variables.

pub mod config;
pub mod loader;


pub use config::{AuthConfig, CacheSettings};
pub use loader::ConfigLoader;

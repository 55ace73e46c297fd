//! Configuration loader for bastion
//!
//! Layers, later ones winning: [`AuthConfig::default`], an optional JSON
//! file, then `BASTION_*` environment variables. The result is validated
//! before it is handed out.

use crate::config::AuthConfig;
use bastion_core::constants::{
    BASTION_AUTH_ENABLED_VAR, BASTION_AUTH_TIMEOUT_MS_VAR, BASTION_BREAKER_FAILURE_LIMIT_VAR,
    BASTION_BREAKER_RESET_SECS_VAR, BASTION_CACHE_TTL_SECS_VAR, BASTION_DEGRADE_VAR,
    BASTION_HEALTH_TIMEOUT_MS_VAR, BASTION_IDENTITY_ENDPOINT_VAR,
    BASTION_NEGATIVE_CACHE_TTL_SECS_VAR, BASTION_SERVICE_NAME_VAR,
};
use bastion_core::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Configuration loader that handles all startup configuration
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Optional JSON config file
    file: Option<PathBuf>,
    /// Whether to apply environment overrides
    use_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            file: None,
            use_env: true,
        }
    }

    /// Read settings from a JSON file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Enable or disable environment overrides
    pub fn env(mut self, use_env: bool) -> Self {
        self.use_env = use_env;
        self
    }

    /// Load and validate the configuration
    pub fn load(self) -> Result<AuthConfig> {
        let mut config = match &self.file {
            Some(path) => AuthConfig::from_file(path)?,
            None => AuthConfig::default(),
        };

        if self.use_env {
            config.apply_env()?;
        }

        config.validate()?;
        tracing::debug!(
            endpoint = %config.identity_endpoint,
            enabled = config.enabled,
            "authorization config loaded"
        );
        Ok(config)
    }
}

impl AuthConfig {
    /// Defaults → optional file → environment, validated
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let loader = ConfigLoader::new();
        match path {
            Some(path) => loader.file(path).load(),
            None => loader.load(),
        }
    }

    /// Read a JSON config file; fields it omits keep their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::file_system(path, "read", e))
            .context("loading config file")?;
        serde_json::from_str(&contents).map_err(|e| {
            Error::configuration(format!("invalid config file '{}': {e}", path.display()))
        })
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(BASTION_IDENTITY_ENDPOINT_VAR) {
            self.identity_endpoint = endpoint;
        }
        if let Some(value) = lookup(BASTION_AUTH_ENABLED_VAR) {
            self.enabled = parse_bool(BASTION_AUTH_ENABLED_VAR, &value)?;
        }
        if let Some(value) = lookup(BASTION_AUTH_TIMEOUT_MS_VAR) {
            self.call_timeout = Duration::from_millis(parse(BASTION_AUTH_TIMEOUT_MS_VAR, &value)?);
        }
        if let Some(value) = lookup(BASTION_HEALTH_TIMEOUT_MS_VAR) {
            self.health_timeout =
                Duration::from_millis(parse(BASTION_HEALTH_TIMEOUT_MS_VAR, &value)?);
        }
        if let Some(value) = lookup(BASTION_CACHE_TTL_SECS_VAR) {
            self.cache_ttl = Duration::from_secs(parse(BASTION_CACHE_TTL_SECS_VAR, &value)?);
        }
        if let Some(value) = lookup(BASTION_NEGATIVE_CACHE_TTL_SECS_VAR) {
            self.negative_cache_ttl =
                Duration::from_secs(parse(BASTION_NEGATIVE_CACHE_TTL_SECS_VAR, &value)?);
        }
        if let Some(value) = lookup(BASTION_BREAKER_FAILURE_LIMIT_VAR) {
            self.failure_limit = parse(BASTION_BREAKER_FAILURE_LIMIT_VAR, &value)?;
        }
        if let Some(value) = lookup(BASTION_BREAKER_RESET_SECS_VAR) {
            self.reset_timeout =
                Duration::from_secs(parse(BASTION_BREAKER_RESET_SECS_VAR, &value)?);
        }
        if let Some(value) = lookup(BASTION_DEGRADE_VAR) {
            self.degrade_on_startup_failure = parse_bool(BASTION_DEGRADE_VAR, &value)?;
        }
        if let Some(name) = lookup(BASTION_SERVICE_NAME_VAR) {
            self.service_name = Some(name).filter(|n| !n.is_empty());
        }
        Ok(())
    }
}

fn parse<T>(variable: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| Error::validation(variable, format!("'{value}': {e}")))
}

fn parse_bool(variable: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => {
            log::warn!("Unrecognised boolean \"{value}\" in {variable}");
            Err(Error::validation(variable, format!("'{value}' is not a boolean")))
        }
    }
}

/// Constants used throughout the bastion codebase
// Permission domain of the state service
pub const STATE_DOMAIN: &str = "state";

// Environment variable names
pub const BASTION_IDENTITY_ENDPOINT_VAR: &str = "BASTION_IDENTITY_ENDPOINT";
pub const BASTION_AUTH_ENABLED_VAR: &str = "BASTION_AUTH_ENABLED";
pub const BASTION_AUTH_TIMEOUT_MS_VAR: &str = "BASTION_AUTH_TIMEOUT_MS";
pub const BASTION_HEALTH_TIMEOUT_MS_VAR: &str = "BASTION_HEALTH_TIMEOUT_MS";
pub const BASTION_CACHE_TTL_SECS_VAR: &str = "BASTION_CACHE_TTL_SECS";
pub const BASTION_NEGATIVE_CACHE_TTL_SECS_VAR: &str = "BASTION_NEGATIVE_CACHE_TTL_SECS";
pub const BASTION_BREAKER_FAILURE_LIMIT_VAR: &str = "BASTION_BREAKER_FAILURE_LIMIT";
pub const BASTION_BREAKER_RESET_SECS_VAR: &str = "BASTION_BREAKER_RESET_SECS";
pub const BASTION_DEGRADE_VAR: &str = "BASTION_DEGRADE_ON_STARTUP_FAILURE";
pub const BASTION_SERVICE_NAME_VAR: &str = "BASTION_SERVICE_NAME";

// Default identity endpoint
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "tcp://127.0.0.1:5555";

// Timeouts (milliseconds)
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 500;

// Cache lifetimes (seconds)
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_NEGATIVE_CACHE_TTL_SECS: u64 = 30;

// Circuit breaker
pub const DEFAULT_FAILURE_LIMIT: usize = 3;
pub const DEFAULT_RESET_TIMEOUT_SECS: u64 = 30;

// Tracing target for authorization decisions
pub const AUDIT_TARGET: &str = "bastion::audit";

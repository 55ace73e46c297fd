//! Access patterns, in evaluation order

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy through which a principal was granted access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccessPattern {
    /// System or full admin, globally or for the requested scope
    Admin,
    /// The required permission held without a scope
    Global,
    /// The required permission held for the requested scope
    Scoped,
    /// The calling service owns the requested scope
    ServiceOwnership,
    /// An explicit cross-service grant for the requested scope
    CrossService,
}

impl AccessPattern {
    /// Every pattern, highest priority first
    pub const PRIORITY: [AccessPattern; 5] = [
        AccessPattern::Admin,
        AccessPattern::Global,
        AccessPattern::Scoped,
        AccessPattern::ServiceOwnership,
        AccessPattern::CrossService,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AccessPattern::Admin => "admin",
            AccessPattern::Global => "global",
            AccessPattern::Scoped => "scoped",
            AccessPattern::ServiceOwnership => "service-ownership",
            AccessPattern::CrossService => "cross-service",
        }
    }
}

impl fmt::Display for AccessPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

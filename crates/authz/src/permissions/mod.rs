//! Permission names, scoping and inheritance
//!
//! Permission names are colon-delimited and always start with the owning
//! domain: `<domain>:<category>:<action>` for global permissions (for example
//! `state:data:write`) and `<domain>:scope:<scope-id>:<action>` once bound to
//! a concrete scope. A trailing `*` segment matches any suffix.
//!
//! Holding one permission may satisfy others: `admin:system` implies
//! `admin:full`, which implies every read/write/delete/create/list/health
//! permission; write and delete imply read; a scoped `admin` implies the
//! scoped read/write/delete/health for the same scope. Cross-service grants
//! (`<domain>:cross-service:<scope>:<action>`) are only ever satisfied
//! explicitly or by the bare domain wildcard.

mod implication;
mod model;


pub use model::PermissionModel;

use serde::{Deserialize, Serialize};

/// Permission suffixes shared by every domain
pub mod names {
    pub const ADMIN_SYSTEM: &str = "admin:system";
    pub const ADMIN_FULL: &str = "admin:full";
    pub const SCOPE_CREATE: &str = "scope:create";
    pub const SCOPE_LIST: &str = "scope:list";
    pub const SCOPE_DELETE: &str = "scope:delete";
    pub const DATA_READ: &str = "data:read";
    pub const DATA_WRITE: &str = "data:write";
    pub const DATA_DELETE: &str = "data:delete";
    pub const DATA_LIST: &str = "data:list";
    pub const HEALTH_READ: &str = "health:read";
    pub const METRICS_READ: &str = "metrics:read";
}

/// Permissions that never take a scope
pub(crate) const GLOBAL_PERMISSIONS: &[&str] = &[
    names::ADMIN_SYSTEM,
    names::ADMIN_FULL,
    names::SCOPE_CREATE,
    names::SCOPE_LIST,
    names::SCOPE_DELETE,
    names::HEALTH_READ,
    names::METRICS_READ,
];

/// Everything `admin:full` implies
pub(crate) const ADMIN_IMPLIED: &[&str] = &[
    names::SCOPE_CREATE,
    names::SCOPE_LIST,
    names::SCOPE_DELETE,
    names::DATA_READ,
    names::DATA_WRITE,
    names::DATA_DELETE,
    names::DATA_LIST,
    names::HEALTH_READ,
    names::METRICS_READ,
];

pub(crate) const SCOPE_SEGMENT: &str = "scope";
pub(crate) const CROSS_SERVICE_SEGMENT: &str = "cross-service";
pub(crate) const WILDCARD: &str = "*";

/// A granted permission, optionally bound to a scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl Permission {
    /// Unscoped permission
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: None,
        }
    }

    /// Permission bound to one scope
    pub fn scoped(name: impl Into<String>, scope: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scope: Some(scope.into()),
        }
    }
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        Permission::new(name)
    }
}

impl From<String> for Permission {
    fn from(name: String) -> Self {
        Permission::new(name)
    }
}

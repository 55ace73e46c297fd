//! Role templates
//!
//! Roles are named permission bundles. They are never assigned to principals
//! here; assignment belongs to the identity service. The catalog only checks
//! that definitions are well formed and computes what each role grants once
//! implication is applied.

use crate::permissions::{names, PermissionModel};
use bastion_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Where a role's permissions apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeClass {
    Global,
    Organization,
    Service,
}

/// A named bundle of permission names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<String>,
    pub scope_class: ScopeClass,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        scope_class: ScopeClass,
        permissions: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            permissions: permissions.into_iter().collect(),
            scope_class,
        }
    }
}

/// Registry of role definitions for one permission domain
#[derive(Debug, Clone)]
pub struct RoleCatalog {
    model: PermissionModel,
    roles: BTreeMap<String, Role>,
}

impl RoleCatalog {
    /// Empty catalog
    pub fn new(model: PermissionModel) -> Self {
        Self {
            model,
            roles: BTreeMap::new(),
        }
    }

    /// Catalog seeded with the stock roles
    pub fn with_defaults(model: PermissionModel) -> Result<Self> {
        let mut catalog = Self::new(model);
        let q = |suffix: &str| catalog.model.qualify(suffix);
        let defaults = vec![
            Role::new(
                "system-admin",
                "Unrestricted control of the domain",
                ScopeClass::Global,
                [q(names::ADMIN_SYSTEM)],
            ),
            Role::new(
                "admin",
                "Full administrative access",
                ScopeClass::Global,
                [q(names::ADMIN_FULL)],
            ),
            Role::new(
                "reader",
                "Read and list data",
                ScopeClass::Organization,
                [q(names::DATA_READ), q(names::DATA_LIST)],
            ),
            Role::new(
                "writer",
                "Read, write and delete data",
                ScopeClass::Organization,
                [q(names::DATA_WRITE), q(names::DATA_DELETE), q(names::DATA_LIST)],
            ),
            Role::new(
                "service",
                "Manage scopes and their data",
                ScopeClass::Service,
                [
                    q(names::SCOPE_CREATE),
                    q(names::SCOPE_DELETE),
                    q(names::DATA_WRITE),
                    q(names::DATA_DELETE),
                    q(names::DATA_LIST),
                ],
            ),
            Role::new(
                "monitor",
                "Health and metrics only",
                ScopeClass::Global,
                [q(names::HEALTH_READ), q(names::METRICS_READ)],
            ),
        ];
        for role in defaults {
            catalog.register(role)?;
        }
        Ok(catalog)
    }

    /// Add a role after validating its name and every permission
    pub fn register(&mut self, role: Role) -> Result<()> {
        if role.name.trim().is_empty() {
            return Err(Error::validation("role", "name is empty"));
        }
        if self.roles.contains_key(&role.name) {
            return Err(Error::validation(
                "role",
                format!("'{}' is already defined", role.name),
            ));
        }
        if role.permissions.is_empty() {
            return Err(Error::validation(
                "role",
                format!("'{}' grants no permissions", role.name),
            ));
        }
        for permission in &role.permissions {
            self.model.validate(permission)?;
        }
        if role.scope_class != ScopeClass::Global
            && role.permissions.iter().any(|p| self.model.is_wildcard(p))
        {
            return Err(Error::validation(
                "role",
                format!("'{}' is not global and may not use wildcards", role.name),
            ));
        }

        tracing::debug!(role = %role.name, class = ?role.scope_class, "Registered role");
        self.roles.insert(role.name.clone(), role);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Role> {
        self.roles.get(name)
    }

    pub fn roles(&self) -> impl Iterator<Item = &Role> {
        self.roles.values()
    }

    /// Direct plus implied permissions of a role
    pub fn effective_permissions(&self, name: &str) -> Option<BTreeSet<String>> {
        let role = self.roles.get(name)?;
        let mut effective = BTreeSet::new();
        for permission in &role.permissions {
            effective.insert(permission.clone());
            effective.extend(self.model.implied_by(permission));
        }
        Some(effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RoleCatalog {
        RoleCatalog::with_defaults(PermissionModel::state()).unwrap()
    }

    #[test]
    fn test_defaults_are_registered() {
        let catalog = catalog();
        for name in ["system-admin", "admin", "reader", "writer", "service", "monitor"] {
            assert!(catalog.get(name).is_some(), "missing role {name}");
        }
    }

    #[test]
    fn test_effective_permissions_include_implications() {
        let catalog = catalog();
        let writer = catalog.effective_permissions("writer").unwrap();
        assert!(writer.contains("state:data:read"));
        assert!(!writer.contains("state:admin:full"));

        let system = catalog.effective_permissions("system-admin").unwrap();
        assert!(system.contains("state:admin:full"));
        assert!(system.contains("state:metrics:read"));
    }

    #[test]
    fn test_register_rejects_foreign_domain() {
        let mut catalog = catalog();
        let role = Role::new(
            "broker-reader",
            "",
            ScopeClass::Global,
            ["broker:data:read".to_string()],
        );
        assert!(catalog.register(role).is_err());
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let mut catalog = catalog();
        let role = Role::new("reader", "", ScopeClass::Global, ["state:data:read".to_string()]);
        assert!(catalog.register(role).is_err());
    }

    #[test]
    fn test_scoped_roles_may_not_use_wildcards() {
        let mut catalog = catalog();
        let role = Role::new("org-all", "", ScopeClass::Organization, ["state:*".to_string()]);
        assert!(catalog.register(role).is_err());
    }

    #[test]
    fn test_unknown_role() {
        assert!(catalog().effective_permissions("nobody").is_none());
    }
}

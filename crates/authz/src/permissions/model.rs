//! Validation, scoping and matching of permission names

use super::{
    Permission, CROSS_SERVICE_SEGMENT, GLOBAL_PERMISSIONS, SCOPE_SEGMENT, WILDCARD,
};
use bastion_core::{Error, Result, STATE_DOMAIN};

/// Permission taxonomy for one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionModel {
    domain: String,
}

impl Default for PermissionModel {
    fn default() -> Self {
        Self::state()
    }
}

impl PermissionModel {
    /// Model for the given domain prefix
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
        }
    }

    /// Model for the state service
    pub fn state() -> Self {
        Self::new(STATE_DOMAIN)
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Prefix a suffix such as `data:read` with the domain
    pub fn qualify(&self, suffix: &str) -> String {
        format!("{}:{}", self.domain, suffix)
    }

    /// Check that `name` is a well-formed permission of this domain
    pub fn validate(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::validation("permission", "name is empty"));
        }
        let segments: Vec<&str> = name.split(':').collect();
        if segments.len() < 2 {
            return Err(Error::validation(
                "permission",
                format!("'{name}' needs at least a domain and an action"),
            ));
        }
        if segments[0] != self.domain {
            return Err(Error::validation(
                "permission",
                format!("'{name}' does not belong to domain '{}'", self.domain),
            ));
        }
        if segments.iter().any(|s| s.is_empty()) {
            return Err(Error::validation(
                "permission",
                format!("'{name}' has an empty segment"),
            ));
        }
        let last = segments.len() - 1;
        if segments[..last].iter().any(|s| s.contains('*'))
            || (segments[last].contains('*') && segments[last] != WILDCARD)
        {
            return Err(Error::validation(
                "permission",
                format!("'{name}' may only use '*' as its final segment"),
            ));
        }
        Ok(())
    }

    /// Check that a scope identifier can be embedded in a permission name
    pub fn validate_scope(&self, scope: &str) -> Result<()> {
        if scope.is_empty() || scope.contains(':') || scope.contains('*') {
            return Err(Error::validation(
                "scope",
                format!("'{scope}' must be non-empty and contain neither ':' nor '*'"),
            ));
        }
        Ok(())
    }

    /// True if `name` ends in a `*` segment
    pub fn is_wildcard(&self, name: &str) -> bool {
        name.ends_with(":*")
    }

    /// True if `name` is one of the statically enumerated unscoped permissions
    pub fn is_global(&self, name: &str) -> bool {
        match name.strip_prefix(self.domain.as_str()).and_then(|r| r.strip_prefix(':')) {
            Some(suffix) => GLOBAL_PERMISSIONS.contains(&suffix),
            None => false,
        }
    }

    /// True if `name` is a `<domain>:scope:<scope>:<action>` permission
    pub fn is_scoped(&self, name: &str) -> bool {
        self.split_bound(name, SCOPE_SEGMENT).is_some()
    }

    /// True if `name` is a `<domain>:cross-service:<scope>:<action>` permission
    pub fn is_cross_service(&self, name: &str) -> bool {
        name.split(':').nth(1) == Some(CROSS_SERVICE_SEGMENT)
    }

    /// `(scope, action)` of a scoped or cross-service permission
    pub(crate) fn split_bound<'a>(&self, name: &'a str, kind: &str) -> Option<(&'a str, &'a str)> {
        let segments: Vec<&'a str> = name.split(':').collect();
        match segments.as_slice() {
            [domain, segment, scope, action] if *domain == self.domain && *segment == kind => {
                Some((*scope, *action))
            }
            _ => None,
        }
    }

    /// The action a permission renders to once bound to a scope
    fn bound_action<'a>(&self, base: &'a str) -> &'a str {
        let segments: Vec<&'a str> = base.split(':').collect();
        match segments.as_slice() {
            [_, "admin", ..] => "admin",
            [_, "health", ..] => "health",
            [.., last] => *last,
            [] => base,
        }
    }

    /// Render `base` for a concrete scope; identity for an empty scope
    pub fn scoped_variant(&self, base: &str, scope: &str) -> String {
        if scope.is_empty() || self.is_scoped(base) {
            return base.to_string();
        }
        format!(
            "{}:{}:{}:{}",
            self.domain,
            SCOPE_SEGMENT,
            scope,
            self.bound_action(base)
        )
    }

    /// Render the explicit cross-service grant for `base` on `scope`
    pub fn cross_service_variant(&self, base: &str, scope: &str) -> String {
        format!(
            "{}:{}:{}:{}",
            self.domain,
            CROSS_SERVICE_SEGMENT,
            scope,
            self.bound_action(base)
        )
    }

    /// The name a granted permission is matched under
    pub fn effective_name(&self, permission: &Permission) -> String {
        match permission.scope.as_deref() {
            Some(scope) => self.scoped_variant(&permission.name, scope),
            None => permission.name.clone(),
        }
    }

    /// Whether holding `granted` is enough for `required`
    pub fn satisfies(&self, granted: &str, required: &str) -> bool {
        if granted == required {
            return true;
        }
        if self.is_wildcard(granted) {
            return self.wildcard_matches(granted, required);
        }
        self.implied_by(granted).contains(required)
    }

    fn wildcard_matches(&self, granted: &str, required: &str) -> bool {
        let prefix = &granted[..granted.len() - WILDCARD.len()];
        if !required.starts_with(prefix) {
            return false;
        }
        // Only the bare domain wildcard reaches cross-service grants
        !self.is_cross_service(required) || granted == self.qualify(WILDCARD)
    }
}

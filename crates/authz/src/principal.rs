//! Validated identities

use crate::permissions::{Permission, PermissionModel};
use crate::validator::ValidationResponse;
use bastion_core::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashSet;

/// Identity and permission set produced by a successful credential check
///
/// Principals are immutable once built; the cache hands out shared
/// references to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    id: String,
    email: Option<String>,
    username: Option<String>,
    service: Option<String>,
    permissions: HashSet<Permission>,
    valid_until: DateTime<Utc>,
}

impl Principal {
    /// A principal with no permissions that never expires
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            username: None,
            service: None,
            permissions: HashSet::new(),
            valid_until: DateTime::<Utc>::MAX_UTC,
        }
    }

    /// Principal used for requests passed through while authorization is off
    #[must_use]
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Mark the principal as acting for `service`
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    #[must_use]
    pub fn with_permission(mut self, permission: impl Into<Permission>) -> Self {
        self.permissions.insert(permission.into());
        self
    }

    #[must_use]
    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = valid_until;
        self
    }

    /// Build a principal from a validator reply
    ///
    /// Permission names outside the model's domain, or otherwise malformed,
    /// are dropped with a warning rather than failing the whole identity.
    pub fn from_response(response: &ValidationResponse, model: &PermissionModel) -> Result<Self> {
        if !response.valid {
            return Err(Error::authentication(
                response
                    .message
                    .clone()
                    .unwrap_or_else(|| "credential rejected by validator".to_string()),
            ));
        }
        let id = match response.principal_id.as_deref() {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => return Err(Error::authentication("validator returned no principal id")),
        };

        let mut principal = Principal::new(id);
        principal.email = response.email.clone();
        principal.username = response.username.clone();
        principal.service = response.service.clone().filter(|s| !s.is_empty());
        if let Some(expires_at) = response.expires_at {
            principal.valid_until = Utc
                .timestamp_opt(expires_at, 0)
                .single()
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
        }

        for name in &response.permissions {
            match model.validate(name) {
                Ok(()) => {
                    principal.permissions.insert(Permission::new(name.as_str()));
                }
                Err(e) => {
                    tracing::warn!(principal = %principal.id, permission = %name, error = %e, "Dropping malformed permission");
                }
            }
        }

        Ok(principal)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Service vouched for by the validator; the ownership pattern uses only this
    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn permissions(&self) -> &HashSet<Permission> {
        &self.permissions
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    /// True once the credential's own expiry has passed
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.valid_until
    }
}

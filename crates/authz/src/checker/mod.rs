//! Access decisions
//!
//! [`AccessChecker`] walks the [`AccessPattern::PRIORITY`] list and grants on
//! the first pattern the principal satisfies. A request that matches nothing
//! yields [`Error::PermissionDenied`], which names the operation and scope
//! but never the permission that would have sufficed.

mod patterns;

#[cfg(test)]
mod tests;

pub use patterns::AccessPattern;

use crate::ownership::ServiceOwnership;
use crate::permissions::{names, PermissionModel};
use crate::principal::Principal;
use bastion_core::{Error, Result};
use std::sync::Arc;

/// One authorization question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    /// Operation name, used for logging and denial messages
    pub operation: String,
    /// Fully qualified permission the operation needs
    pub required: String,
    /// Target scope; empty for scope-less operations
    pub scope: String,
}

impl AccessRequest {
    pub fn new(
        operation: impl Into<String>,
        required: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            required: required.into(),
            scope: scope.into(),
        }
    }
}

/// Evaluates access requests against principals
#[derive(Debug, Clone)]
pub struct AccessChecker {
    model: PermissionModel,
    ownership: Arc<ServiceOwnership>,
}

impl AccessChecker {
    pub fn new(model: PermissionModel, ownership: Arc<ServiceOwnership>) -> Self {
        Self { model, ownership }
    }

    pub fn model(&self) -> &PermissionModel {
        &self.model
    }

    pub fn ownership(&self) -> &Arc<ServiceOwnership> {
        &self.ownership
    }

    /// Decide `request` for `principal`, returning the pattern that matched
    pub fn check_access(&self, principal: &Principal, request: &AccessRequest) -> Result<AccessPattern> {
        let grants: Vec<String> = principal
            .permissions()
            .iter()
            .map(|p| self.model.effective_name(p))
            .collect();

        let matched = AccessPattern::PRIORITY
            .into_iter()
            .find(|pattern| self.matches(*pattern, principal, &grants, request));

        match matched {
            Some(pattern) => {
                tracing::info!(
                    principal = %principal.id(),
                    operation = %request.operation,
                    scope = %request.scope,
                    pattern = %pattern,
                    "Access granted"
                );
                Ok(pattern)
            }
            None => {
                tracing::info!(
                    principal = %principal.id(),
                    operation = %request.operation,
                    scope = %request.scope,
                    "Access denied"
                );
                Err(Error::permission_denied(&request.operation, &request.scope))
            }
        }
    }

    fn matches(
        &self,
        pattern: AccessPattern,
        principal: &Principal,
        grants: &[String],
        request: &AccessRequest,
    ) -> bool {
        let scope = request.scope.as_str();
        let bindable = self.is_scope_bindable(&request.required);
        match pattern {
            AccessPattern::Admin => {
                let system = self.model.qualify(names::ADMIN_SYSTEM);
                let full = self.model.qualify(names::ADMIN_FULL);
                if self.holds(grants, &system) || self.holds(grants, &full) {
                    return true;
                }
                !scope.is_empty()
                    && !self.model.is_global(&request.required)
                    && self.holds(grants, &self.model.scoped_variant(&full, scope))
            }
            AccessPattern::Global => self.holds(grants, &request.required),
            AccessPattern::Scoped => {
                !scope.is_empty()
                    && bindable
                    && self.holds(grants, &self.model.scoped_variant(&request.required, scope))
            }
            // The service comes from the validated principal, never the message
            AccessPattern::ServiceOwnership => {
                !scope.is_empty()
                    && self.ownership_suffices(&request.required)
                    && principal
                        .service()
                        .is_some_and(|service| self.ownership.is_owner(scope, service))
            }
            AccessPattern::CrossService => {
                !scope.is_empty()
                    && bindable
                    && self.holds(
                        grants,
                        &self.model.cross_service_variant(&request.required, scope),
                    )
            }
        }
    }

    fn holds(&self, grants: &[String], required: &str) -> bool {
        grants.iter().any(|granted| self.model.satisfies(granted, required))
    }

    /// Scope management and admin permissions are never bound to a scope
    fn is_scope_bindable(&self, required: &str) -> bool {
        !self.model.is_global(required) || required == self.model.qualify(names::HEALTH_READ)
    }

    fn ownership_suffices(&self, required: &str) -> bool {
        [
            names::DATA_READ,
            names::DATA_WRITE,
            names::DATA_DELETE,
            names::HEALTH_READ,
        ]
        .iter()
        .any(|suffix| required == self.model.qualify(suffix))
    }
}

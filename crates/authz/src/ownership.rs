//! Scope ownership registry

use parking_lot::RwLock;
use std::collections::HashMap;

/// Maps each scope to the service that owns it
///
/// Registration is last-writer-wins; there is no transfer protocol.
#[derive(Debug, Default)]
pub struct ServiceOwnership {
    owners: RwLock<HashMap<String, String>>,
}

impl ServiceOwnership {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `service` as the owner of `scope`, returning any previous owner
    pub fn register(&self, scope: impl Into<String>, service: impl Into<String>) -> Option<String> {
        let scope = scope.into();
        let service = service.into();
        let previous = self.owners.write().insert(scope.clone(), service.clone());
        match &previous {
            Some(old) if *old != service => {
                tracing::warn!(%scope, previous = %old, owner = %service, "Scope owner replaced");
            }
            _ => tracing::debug!(%scope, owner = %service, "Scope owner registered"),
        }
        previous
    }

    /// Forget the owner of `scope`
    pub fn unregister(&self, scope: &str) -> Option<String> {
        let removed = self.owners.write().remove(scope);
        if removed.is_some() {
            tracing::debug!(%scope, "Scope owner unregistered");
        }
        removed
    }

    pub fn owner_of(&self, scope: &str) -> Option<String> {
        self.owners.read().get(scope).cloned()
    }

    pub fn is_owner(&self, scope: &str, service: &str) -> bool {
        self.owners
            .read()
            .get(scope)
            .is_some_and(|owner| owner == service)
    }

    /// Scopes currently owned by `service`, sorted
    pub fn scopes_owned_by(&self, service: &str) -> Vec<String> {
        let mut scopes: Vec<String> = self
            .owners
            .read()
            .iter()
            .filter(|(_, owner)| owner.as_str() == service)
            .map(|(scope, _)| scope.clone())
            .collect();
        scopes.sort();
        scopes
    }

    pub fn len(&self) -> usize {
        self.owners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.read().is_empty()
    }
}

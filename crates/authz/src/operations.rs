//! Operation to permission classification

use crate::permissions::{names, PermissionModel};
use std::collections::HashMap;

/// What an operation needs before it may run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationRule {
    /// Fully qualified permission name
    pub permission: String,
    /// Whether a non-empty scope must accompany the request
    pub requires_scope: bool,
}

/// Static operation table with a fail-closed fallback
///
/// Operations missing from the table require `admin:system` and a scope.
#[derive(Debug, Clone)]
pub struct OperationTable {
    rules: HashMap<String, OperationRule>,
    fallback: OperationRule,
}

impl OperationTable {
    /// Table with no registered operations
    pub fn empty(model: &PermissionModel) -> Self {
        Self {
            rules: HashMap::new(),
            fallback: OperationRule {
                permission: model.qualify(names::ADMIN_SYSTEM),
                requires_scope: true,
            },
        }
    }

    /// The state service's operations
    pub fn with_defaults(model: &PermissionModel) -> Self {
        let mut table = Self::empty(model);
        let defaults: [(&str, &str, bool); 10] = [
            ("create-scope", names::SCOPE_CREATE, true),
            ("delete-scope", names::SCOPE_DELETE, true),
            ("list-scopes", names::SCOPE_LIST, false),
            ("get", names::DATA_READ, true),
            ("set", names::DATA_WRITE, true),
            ("delete", names::DATA_DELETE, true),
            ("list", names::DATA_LIST, true),
            ("keys", names::DATA_LIST, true),
            ("health", names::HEALTH_READ, false),
            ("metrics", names::METRICS_READ, false),
        ];
        for (operation, suffix, requires_scope) in defaults {
            table.register(operation, model.qualify(suffix), requires_scope);
        }
        table
    }

    /// Add or replace the rule for `operation`
    pub fn register(
        &mut self,
        operation: impl Into<String>,
        permission: impl Into<String>,
        requires_scope: bool,
    ) {
        self.rules.insert(
            operation.into(),
            OperationRule {
                permission: permission.into(),
                requires_scope,
            },
        );
    }

    /// Rule for `operation`, falling back to the admin rule
    pub fn rule(&self, operation: &str) -> &OperationRule {
        self.rules.get(operation).unwrap_or(&self.fallback)
    }

    pub fn is_known(&self, operation: &str) -> bool {
        self.rules.contains_key(operation)
    }

    pub fn required_permission(&self, operation: &str) -> &str {
        &self.rule(operation).permission
    }

    pub fn requires_scope(&self, operation: &str) -> bool {
        self.rule(operation).requires_scope
    }
}

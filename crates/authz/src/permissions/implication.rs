//! Transitive implication closure

use super::{model::PermissionModel, names, ADMIN_IMPLIED, SCOPE_SEGMENT};
use std::collections::BTreeSet;

/// Actions a scoped `admin` grant covers within its scope
const SCOPED_ADMIN_IMPLIED: &[&str] = &["read", "write", "delete", "list", "health"];

impl PermissionModel {
    /// Every permission a grant of `granted` also satisfies, excluding itself
    pub fn implied_by(&self, granted: &str) -> BTreeSet<String> {
        let mut closure = BTreeSet::new();
        let mut pending = vec![granted.to_string()];

        while let Some(current) = pending.pop() {
            for next in self.direct_implications(&current) {
                if next != granted && closure.insert(next.clone()) {
                    pending.push(next);
                }
            }
        }

        closure
    }

    /// One step of the implication table
    fn direct_implications(&self, name: &str) -> Vec<String> {
        if let Some((scope, action)) = self.split_bound(name, SCOPE_SEGMENT) {
            return match action {
                "admin" => SCOPED_ADMIN_IMPLIED
                    .iter()
                    .map(|a| self.scoped_name(scope, a))
                    .collect(),
                "write" | "delete" => vec![self.scoped_name(scope, "read")],
                _ => Vec::new(),
            };
        }

        let Some(suffix) = name
            .strip_prefix(self.domain())
            .and_then(|rest| rest.strip_prefix(':'))
        else {
            return Vec::new();
        };

        match suffix {
            names::ADMIN_SYSTEM => vec![self.qualify(names::ADMIN_FULL)],
            names::ADMIN_FULL => ADMIN_IMPLIED.iter().map(|s| self.qualify(s)).collect(),
            names::DATA_WRITE | names::DATA_DELETE => vec![self.qualify(names::DATA_READ)],
            names::SCOPE_DELETE => vec![self.qualify(names::SCOPE_LIST)],
            _ => Vec::new(),
        }
    }

    fn scoped_name(&self, scope: &str, action: &str) -> String {
        format!("{}:{}:{}:{}", self.domain(), SCOPE_SEGMENT, scope, action)
    }
}

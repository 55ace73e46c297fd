//! Audit record types

use crate::checker::AccessPattern;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How an authorization decision ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Access granted through `pattern`
    Granted { pattern: AccessPattern },
    /// Request refused; `reason` is the error kind
    Denied { reason: String },
    /// Authorization was disabled and the request passed unchecked
    Bypassed,
}

impl AuditOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, AuditOutcome::Granted { .. })
    }
}

/// One record per authorization decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Known once the credential has been validated
    pub principal_id: Option<String>,
    /// Short digest of the presented credential
    pub credential: Option<String>,
    pub operation: String,
    pub scope: String,
    #[serde(flatten)]
    pub outcome: AuditOutcome,
}

impl AuditRecord {
    pub fn new(operation: impl Into<String>, scope: impl Into<String>, outcome: AuditOutcome) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            principal_id: None,
            credential: None,
            operation: operation.into(),
            scope: scope.into(),
            outcome,
        }
    }

    #[must_use]
    pub fn with_principal(mut self, principal_id: impl Into<String>) -> Self {
        self.principal_id = Some(principal_id.into());
        self
    }

    #[must_use]
    pub fn with_credential(mut self, fingerprint: impl Into<String>) -> Self {
        self.credential = Some(fingerprint.into());
        self
    }
}

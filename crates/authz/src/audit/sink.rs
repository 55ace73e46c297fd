//! Audit destinations

use super::events::{AuditOutcome, AuditRecord};
use bastion_core::AUDIT_TARGET;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Receives every audit record
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Emits records as structured events on the audit tracing target
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        let principal = record.principal_id.as_deref().unwrap_or("-");
        let credential = record.credential.as_deref().unwrap_or("-");
        match &record.outcome {
            AuditOutcome::Granted { pattern } => tracing::info!(
                target: AUDIT_TARGET,
                id = %record.id,
                principal,
                credential,
                operation = %record.operation,
                scope = %record.scope,
                pattern = %pattern,
                "granted"
            ),
            AuditOutcome::Denied { reason } => tracing::info!(
                target: AUDIT_TARGET,
                id = %record.id,
                principal,
                credential,
                operation = %record.operation,
                scope = %record.scope,
                reason = %reason,
                "denied"
            ),
            AuditOutcome::Bypassed => tracing::warn!(
                target: AUDIT_TARGET,
                id = %record.id,
                operation = %record.operation,
                scope = %record.scope,
                "bypassed: authorization disabled"
            ),
        }
    }
}

/// Keeps the most recent records in memory
#[derive(Debug)]
pub struct MemoryAuditSink {
    capacity: usize,
    records: Mutex<VecDeque<AuditRecord>>,
}

impl MemoryAuditSink {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            records: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Oldest first
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl Default for MemoryAuditSink {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &AuditRecord) {
        let mut records = self.records.lock();
        if records.len() == self.capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
    }
}

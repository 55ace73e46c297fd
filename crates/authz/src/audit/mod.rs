//! Authorization audit trail
//!
//! Every decision the middleware makes produces exactly one
//! [`AuditRecord`], fanned out to each registered [`AuditSink`].

mod events;
mod sink;

pub use events::{AuditOutcome, AuditRecord};
pub use sink::{AuditSink, MemoryAuditSink, TracingAuditSink};

use std::fmt;
use std::sync::Arc;

/// Fan-out to a set of sinks
#[derive(Clone)]
pub struct AuditLog {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl AuditLog {
    /// Log with no sinks; records are dropped
    pub fn silent() -> Self {
        Self { sinks: Vec::new() }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn record(&self, record: AuditRecord) {
        for sink in &self.sinks {
            sink.record(&record);
        }
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::silent().with_sink(Arc::new(TracingAuditSink))
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog")
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

//! Audit trail for credential resolutions

mod sink;
mod types;

pub use sink::{AuditSink, JsonlAuditSink, MemoryAuditSink, MultiAuditSink, TracingAuditSink};
pub use types::{AuditContext, AuditRecord, Severity};

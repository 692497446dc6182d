//! Audit logging port.

use serde_json::Value;
use tracing::info;

/// Structured audit trail for operator-facing actions.
pub trait AuditLogger: Send + Sync {
    fn log_action(&self, action: &str, category: &str, subject_id: &str, details: &Value);
}

/// Audit logger writing to the `audit` tracing target.
#[derive(Default)]
pub struct TracingAuditLogger;

impl AuditLogger for TracingAuditLogger {
    fn log_action(&self, action: &str, category: &str, subject_id: &str, details: &Value) {
        info!(
            target: "audit",
            action,
            category,
            subject_id,
            details = %details,
            "audit action"
        );
    }
}

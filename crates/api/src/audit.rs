//! Fire-and-forget audit trail recorder.
//!
//! Every state-changing operation calls [`AuditRecorder::record`] after
//! its transaction commits. Recording is synchronous but isolated: an
//! audit insert failure is logged and swallowed so it can never fail the
//! business operation it describes.

use parcelhub_core::audit::{redact_sensitive_fields, Category, Severity};
use parcelhub_core::types::DbId;
use parcelhub_db::models::audit::CreateAuditEvent;
use parcelhub_db::repositories::AuditEventRepo;
use parcelhub_db::DbPool;

/// A single audit entry ready for recording.
#[derive(Debug)]
pub struct AuditEntry {
    pub action_code: &'static str,
    pub category: Category,
    pub severity: Severity,
    /// Admin username or recipient email, when known.
    pub actor: Option<String>,
    pub parcel_id: Option<DbId>,
    pub locker_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
}

/// Narrow audit sink injected into handlers via [`crate::state::AppState`].
#[derive(Clone)]
pub struct AuditRecorder {
    pool: DbPool,
}

impl AuditRecorder {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Record one audit event. Sensitive keys in `details` are redacted
    /// before the insert. Failures are logged, never propagated.
    pub async fn record(&self, entry: AuditEntry) {
        let details = entry.details.as_ref().map(redact_sensitive_fields);

        let create = CreateAuditEvent {
            action_code: entry.action_code.to_string(),
            category: entry.category.as_str().to_string(),
            severity: entry.severity.as_str().to_string(),
            actor: entry.actor,
            parcel_id: entry.parcel_id,
            locker_id: entry.locker_id,
            details,
        };

        if let Err(e) = AuditEventRepo::insert(&self.pool, &create).await {
            tracing::error!(
                error = %e,
                action_code = entry.action_code,
                "Failed to record audit event"
            );
        }
    }
}

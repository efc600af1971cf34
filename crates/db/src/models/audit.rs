//! Audit event entity model and DTOs.
//!
//! Audit events are append-only: the application inserts and reads but
//! never updates or deletes them (no `updated_at` column). Retention is an
//! external operational concern.

use parcelhub_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single audit event. Immutable once created.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: DbId,
    pub occurred_at: Timestamp,
    pub action_code: String,
    pub category: String,
    pub severity: String,
    /// Who triggered the action: an admin username or a recipient email.
    pub actor: Option<String>,
    pub parcel_id: Option<DbId>,
    pub locker_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit event.
#[derive(Debug, Clone)]
pub struct CreateAuditEvent {
    pub action_code: String,
    pub category: String,
    pub severity: String,
    pub actor: Option<String>,
    pub parcel_id: Option<DbId>,
    pub locker_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
}

/// Filter parameters for querying audit events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub action_code: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub parcel_id: Option<DbId>,
    pub locker_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Paginated response for audit event queries.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEventPage {
    pub items: Vec<AuditEvent>,
    pub total: i64,
}

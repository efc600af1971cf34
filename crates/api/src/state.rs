use std::sync::Arc;

use parcelhub_events::NotificationSender;

use crate::audit::AuditRecorder;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already
/// `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: parcelhub_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Outbound email delivery (best-effort; never rolls back a commit).
    pub mailer: Arc<dyn NotificationSender>,
    /// Fire-and-forget audit trail recorder.
    pub audit: AuditRecorder,
}

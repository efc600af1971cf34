//! Route definitions for the admin audit trail.

use axum::routing::get;
use axum::Router;

use crate::handlers::audit;
use crate::state::AppState;

/// Audit routes mounted at `/admin/audit-events`. Admin only.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(audit::query_audit_events))
}

//! HTTP handlers, grouped by resource.

pub mod audit;
pub mod auth;
pub mod lockers;
pub mod parcels;

use parcelhub_core::types::DbId;
use parcelhub_db::repositories::AdminUserRepo;

use crate::state::AppState;

/// Resolve an admin id to an audit actor string.
///
/// Prefers the username; falls back to `admin:<id>` if the row is gone or
/// the lookup fails (the audit entry is still worth recording).
pub(crate) async fn admin_actor(state: &AppState, admin_id: DbId) -> String {
    match AdminUserRepo::find_by_id(&state.pool, admin_id).await {
        Ok(Some(admin)) => admin.username,
        _ => format!("admin:{admin_id}"),
    }
}

//! Route definitions for admin locker management.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::lockers;
use crate::state::AppState;

/// Locker admin routes mounted at `/admin/lockers`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET  /              -> list_lockers
/// POST /              -> create_locker
/// PUT  /{id}/status   -> set_locker_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(lockers::list_lockers).post(lockers::create_locker),
        )
        .route("/{id}/status", put(lockers::set_locker_status))
}

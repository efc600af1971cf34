pub mod audit;
pub mod auth;
pub mod health;
pub mod lockers;
pub mod parcels;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /deposit                                POST  deposit a parcel (public)
/// /pickup                                 POST  pick up with PIN (public)
/// /deposit/{parcel_id}/retract            POST  sender undo
/// /parcel/{parcel_id}/reissue-pin         POST  replacement PIN
/// /pickup/{parcel_id}/dispute             POST  flag pickup irregularity
/// /parcel/{parcel_id}/report-missing      POST  mark parcel missing
///
/// /auth/login                             POST  admin login (public)
///
/// /admin/lockers                          GET list, POST provision (admin)
/// /admin/lockers/{id}/status              PUT state-machine change (admin)
/// /admin/audit-events                     GET filtered query (admin)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(parcels::router())
        .nest("/auth", auth::router())
        .nest("/admin/lockers", lockers::router())
        .nest("/admin/audit-events", audit::router())
}

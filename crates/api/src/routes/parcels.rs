//! Route definitions for the parcel workflow.

use axum::routing::post;
use axum::Router;

use crate::handlers::parcels;
use crate::state::AppState;

/// Parcel workflow routes, mounted directly under `/api/v1`.
///
/// All routes are public: deposit and pickup happen at the locker bank
/// terminal without an account. Pickup authorization is the PIN itself.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/deposit", post(parcels::deposit))
        .route("/pickup", post(parcels::pickup))
        .route("/deposit/{parcel_id}/retract", post(parcels::retract))
        .route("/parcel/{parcel_id}/reissue-pin", post(parcels::reissue_pin))
        .route("/pickup/{parcel_id}/dispute", post(parcels::dispute_pickup))
        .route(
            "/parcel/{parcel_id}/report-missing",
            post(parcels::report_missing),
        )
}

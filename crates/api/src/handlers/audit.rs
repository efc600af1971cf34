//! Handlers for the admin audit trail endpoints.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use parcelhub_db::models::audit::{AuditEventPage, AuditQuery};
use parcelhub_db::repositories::AuditEventRepo;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for audit event queries.
#[derive(Debug, Deserialize)]
pub struct AuditQueryParams {
    pub action_code: Option<String>,
    pub category: Option<String>,
    pub severity: Option<String>,
    pub parcel_id: Option<i64>,
    pub locker_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Parse an optional ISO 8601 timestamp query parameter.
fn parse_timestamp(
    s: Option<&str>,
) -> AppResult<Option<chrono::DateTime<chrono::Utc>>> {
    s.map(|v| {
        v.parse::<chrono::DateTime<chrono::Utc>>()
            .map_err(|_| AppError::BadRequest("Invalid date format".into()))
    })
    .transpose()
}

/// GET /api/v1/admin/audit-events
///
/// Query audit events with filters and pagination, newest first. Admin
/// only.
pub async fn query_audit_events(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<AuditQueryParams>,
) -> AppResult<impl IntoResponse> {
    let query = AuditQuery {
        action_code: params.action_code,
        category: params.category,
        severity: params.severity,
        parcel_id: params.parcel_id,
        locker_id: params.locker_id,
        from: parse_timestamp(params.from.as_deref())?,
        to: parse_timestamp(params.to.as_deref())?,
        limit: params.limit,
        offset: params.offset,
    };

    let items = AuditEventRepo::query(&state.pool, &query).await?;
    let total = AuditEventRepo::count(&state.pool, &query).await?;

    Ok(Json(DataResponse {
        data: AuditEventPage { items, total },
    }))
}

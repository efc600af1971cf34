//! Handlers for admin locker management.
//!
//! All endpoints require the `admin` role. Status changes are validated
//! against the locker state machine before touching the database, and the
//! free transition is additionally rejected while a deposited parcel
//! still references the locker.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use parcelhub_core::audit::{action_codes, Category, Severity};
use parcelhub_core::error::CoreError;
use parcelhub_core::locker::{LockerSize, LockerStatus};
use parcelhub_core::types::{DbId, Timestamp};
use parcelhub_db::models::locker::{CreateLocker, Locker, LockerFilter};
use parcelhub_db::repositories::{LockerRepo, ParcelRepo};
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::handlers::admin_actor;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /admin/lockers`.
#[derive(Debug, Deserialize)]
pub struct ListLockersParams {
    pub size: Option<String>,
    pub status: Option<String>,
}

/// Request body for `POST /admin/lockers`.
#[derive(Debug, Deserialize)]
pub struct CreateLockerRequest {
    pub location: String,
    pub size: String,
}

/// Request body for `PUT /admin/lockers/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}

/// Locker representation for API responses, with decoded size and status
/// names instead of lookup ids.
#[derive(Debug, Serialize)]
pub struct LockerResponse {
    pub id: DbId,
    pub location: String,
    pub size: &'static str,
    pub status: &'static str,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Decode a locker row for output, treating unknown ids as corruption.
fn locker_response(locker: Locker) -> Result<LockerResponse, AppError> {
    let size = locker.size().ok_or_else(|| {
        AppError::InternalError(format!(
            "locker {} has unknown size id {}",
            locker.id, locker.size_id
        ))
    })?;
    let status = locker.status().ok_or_else(|| {
        AppError::InternalError(format!(
            "locker {} has unknown status id {}",
            locker.id, locker.status_id
        ))
    })?;
    Ok(LockerResponse {
        id: locker.id,
        location: locker.location,
        size: size.as_str(),
        status: status.as_str(),
        created_at: locker.created_at,
        updated_at: locker.updated_at,
    })
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/lockers
///
/// List lockers, optionally filtered by size and status. Admin only.
pub async fn list_lockers(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<ListLockersParams>,
) -> AppResult<impl IntoResponse> {
    let size_id = params
        .size
        .as_deref()
        .map(|s| s.parse::<LockerSize>().map(LockerSize::id))
        .transpose()
        .map_err(AppError::Core)?;
    let status_id = params
        .status
        .as_deref()
        .map(|s| s.parse::<LockerStatus>().map(LockerStatus::id))
        .transpose()
        .map_err(AppError::Core)?;

    let lockers = LockerRepo::list(&state.pool, &LockerFilter { size_id, status_id }).await?;
    let items = lockers
        .into_iter()
        .map(locker_response)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(DataResponse { data: items }))
}

/// POST /api/v1/admin/lockers
///
/// Provision a new locker in the `free` status. Admin only.
pub async fn create_locker(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateLockerRequest>,
) -> AppResult<impl IntoResponse> {
    if input.location.trim().is_empty() {
        return Err(CoreError::Validation("location must not be empty".into()).into());
    }
    let size: LockerSize = input.size.parse().map_err(AppError::Core)?;

    let locker = LockerRepo::create(
        &state.pool,
        &CreateLocker {
            location: input.location,
            size_id: size.id(),
        },
    )
    .await?;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::ADMIN_LOCKER_PROVISIONED,
            category: Category::AdminAction,
            severity: Severity::Low,
            actor: Some(admin_actor(&state, admin.admin_id).await),
            parcel_id: None,
            locker_id: Some(locker.id),
            details: Some(serde_json::json!({
                "location": locker.location,
                "size": size.as_str(),
            })),
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: locker_response(locker)?,
        }),
    ))
}

/// PUT /api/v1/admin/lockers/{id}/status
///
/// Change a locker's status, enforcing the state machine. Freeing a
/// locker that a deposited parcel still references is rejected. Admin
/// only.
pub async fn set_locker_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let target: LockerStatus = input.status.parse().map_err(AppError::Core)?;

    let locker = LockerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "locker", id }))?;
    let current = locker.status().ok_or_else(|| {
        AppError::InternalError(format!(
            "locker {} has unknown status id {}",
            locker.id, locker.status_id
        ))
    })?;

    current.check_transition(target).map_err(AppError::Core)?;

    // Enabling a locker requires it to actually be empty.
    if target == LockerStatus::Free
        && ParcelRepo::count_deposited_for_locker(&state.pool, id).await? > 0
    {
        return Err(CoreError::InvalidTransition {
            from: current.as_str(),
            to: target.as_str(),
        }
        .into());
    }

    let updated = LockerRepo::set_status(&state.pool, id, target.id())
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "locker", id }))?;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::ADMIN_LOCKER_STATUS_CHANGE,
            category: Category::AdminAction,
            severity: Severity::Medium,
            actor: Some(admin_actor(&state, admin.admin_id).await),
            parcel_id: None,
            locker_id: Some(updated.id),
            details: Some(serde_json::json!({
                "from": current.as_str(),
                "to": target.as_str(),
            })),
        })
        .await;

    Ok(Json(DataResponse {
        data: locker_response(updated)?,
    }))
}

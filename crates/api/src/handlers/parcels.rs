//! Handlers for the parcel workflow: deposit, pickup, retract, PIN
//! reissue, pickup dispute, and missing report.
//!
//! Pickup failures deliberately share one generic response
//! ([`CoreError::PickupRejected`]) while the audit trail records the
//! precise cause per attempt.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use parcelhub_core::audit::{action_codes, Category, Severity};
use parcelhub_core::error::CoreError;
use parcelhub_core::locker::{LockerSize, LockerStatus};
use parcelhub_core::parcel::ParcelStatus;
use parcelhub_core::pin::{self, ReissueDecision};
use parcelhub_core::types::{DbId, Timestamp};
use parcelhub_core::validation;
use parcelhub_db::models::parcel::{CreateParcel, Parcel, PinMaterial};
use parcelhub_db::repositories::{LockerRepo, ParcelRepo};
use parcelhub_events::messages;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::error::{AppError, AppResult};
use crate::handlers::admin_actor;
use crate::middleware::auth::claims_from_headers;
use crate::middleware::rbac::ROLE_ADMIN;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /deposit`.
#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub recipient_email: String,
    /// Locker size class: `small`, `medium`, or `large`.
    pub size: String,
}

/// Response for a successful deposit. The PIN appears here exactly once
/// and is otherwise only delivered by email.
#[derive(Debug, Serialize)]
pub struct DepositResponse {
    pub parcel_id: DbId,
    pub locker_id: DbId,
    pub location: String,
    pub pin: String,
    pub expires_at: Timestamp,
}

/// Request body for `POST /pickup`.
#[derive(Debug, Deserialize)]
pub struct PickupRequest {
    pub parcel_id: DbId,
    pub pin: String,
}

/// Response for a successful pickup.
#[derive(Debug, Serialize)]
pub struct PickupResponse {
    pub parcel_id: DbId,
    pub locker_id: DbId,
    pub status: &'static str,
}

/// Response for a successful PIN reissue. Like the deposit response, the
/// PIN appears exactly once.
#[derive(Debug, Serialize)]
pub struct ReissueResponse {
    pub parcel_id: DbId,
    pub pin: String,
    pub expires_at: Timestamp,
}

/// Generic status-change response for retract/dispute/missing.
#[derive(Debug, Serialize)]
pub struct ParcelStatusResponse {
    pub parcel_id: DbId,
    pub status: &'static str,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Load a parcel or produce a 404.
async fn must_find_parcel(state: &AppState, id: DbId) -> AppResult<Parcel> {
    ParcelRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "parcel", id }))
}

/// Decode the parcel status column, treating an unknown id as corruption.
fn parcel_status(parcel: &Parcel) -> Result<ParcelStatus, AppError> {
    parcel.status().ok_or_else(|| {
        AppError::InternalError(format!(
            "parcel {} has unknown status id {}",
            parcel.id, parcel.status_id
        ))
    })
}

/// The locker a deposited parcel must reference.
fn assigned_locker_id(parcel: &Parcel) -> Result<DbId, AppError> {
    parcel.locker_id.ok_or_else(|| {
        AppError::InternalError(format!(
            "deposited parcel {} has no locker reference",
            parcel.id
        ))
    })
}

/// Record a failed pickup attempt with its precise cause.
async fn record_pickup_failure(
    state: &AppState,
    action_code: &'static str,
    parcel_id: Option<DbId>,
    reason: &str,
) {
    state
        .audit
        .record(AuditEntry {
            action_code,
            category: Category::SecurityEvent,
            severity: Severity::Medium,
            actor: None,
            parcel_id,
            locker_id: None,
            details: Some(serde_json::json!({ "reason": reason })),
        })
        .await;
}

/// Send a PIN-carrying email, best-effort.
///
/// The enclosing business transaction is already committed when this
/// runs; a delivery failure is logged as an `error_event` and the PIN
/// remains valid regardless.
async fn send_pin_email(
    state: &AppState,
    parcel: &Parcel,
    locker_id: DbId,
    subject: &str,
    body: &str,
) {
    if let Err(e) = state
        .mailer
        .send(&parcel.recipient_email, subject, body)
        .await
    {
        tracing::error!(parcel_id = parcel.id, error = %e, "PIN email delivery failed");
        state
            .audit
            .record(AuditEntry {
                action_code: action_codes::NOTIFICATION_FAILED,
                category: Category::ErrorEvent,
                severity: Severity::Medium,
                actor: None,
                parcel_id: Some(parcel.id),
                locker_id: Some(locker_id),
                details: Some(serde_json::json!({ "reason": e.to_string() })),
            })
            .await;
    }
}

// ---------------------------------------------------------------------------
// Deposit
// ---------------------------------------------------------------------------

/// POST /api/v1/deposit
///
/// Claim a free locker of the requested size, create the parcel, and
/// return the one-time PIN. Locker claim and parcel insert are one
/// transaction; the email and audit entry follow the commit.
pub async fn deposit(
    State(state): State<AppState>,
    Json(input): Json<DepositRequest>,
) -> AppResult<impl IntoResponse> {
    validation::validate_recipient_email(&input.recipient_email).map_err(AppError::Core)?;
    let size: LockerSize = input.size.parse().map_err(AppError::Core)?;

    let generated = pin::generate(
        chrono::Duration::hours(state.config.pin_ttl_hours),
        state.config.pin_kdf_iterations,
        Utc::now(),
    );

    let create = CreateParcel {
        recipient_email: input.recipient_email,
        pin: PinMaterial {
            pin_hash: generated.hash_hex.clone(),
            pin_salt: generated.salt_hex.clone(),
            pin_kdf_iterations: state.config.pin_kdf_iterations as i32,
            pin_generated_at: generated.generated_at,
            expires_at: generated.expires_at,
        },
    };

    let Some((parcel, locker)) =
        ParcelRepo::create_deposit(&state.pool, size.id(), &create).await?
    else {
        return Err(CoreError::NoLockerAvailable {
            size: size.as_str(),
        }
        .into());
    };

    let (subject, body) =
        messages::pin_delivery(&locker.location, &generated.plaintext, generated.expires_at);
    send_pin_email(&state, &parcel, locker.id, &subject, &body).await;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::USER_DEPOSIT,
            category: Category::UserAction,
            severity: Severity::Low,
            actor: Some(parcel.recipient_email.clone()),
            parcel_id: Some(parcel.id),
            locker_id: Some(locker.id),
            details: Some(serde_json::json!({
                "size": size.as_str(),
                "location": locker.location,
            })),
        })
        .await;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: DepositResponse {
                parcel_id: parcel.id,
                locker_id: locker.id,
                location: locker.location,
                pin: generated.plaintext,
                expires_at: generated.expires_at,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Pickup
// ---------------------------------------------------------------------------

/// POST /api/v1/pickup
///
/// Validate the PIN and release the parcel. Every failure path returns
/// the same generic rejection; only the audit trail distinguishes a wrong
/// PIN from an expired one or an unknown parcel.
pub async fn pickup(
    State(state): State<AppState>,
    Json(input): Json<PickupRequest>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();

    // Format check first: clearly-invalid input never reaches the KDF.
    if !pin::is_valid_format(&input.pin) {
        record_pickup_failure(
            &state,
            action_codes::USER_PICKUP_INVALID_PIN,
            Some(input.parcel_id),
            "malformed PIN",
        )
        .await;
        return Err(CoreError::PickupRejected.into());
    }

    let Some(parcel) = ParcelRepo::find_by_id(&state.pool, input.parcel_id).await? else {
        record_pickup_failure(
            &state,
            action_codes::USER_PICKUP_UNKNOWN_PARCEL,
            Some(input.parcel_id),
            "unknown parcel",
        )
        .await;
        return Err(CoreError::PickupRejected.into());
    };

    if parcel_status(&parcel)? != ParcelStatus::Deposited {
        record_pickup_failure(
            &state,
            action_codes::USER_PICKUP_UNKNOWN_PARCEL,
            Some(parcel.id),
            "parcel not awaiting pickup",
        )
        .await;
        return Err(CoreError::PickupRejected.into());
    }

    if pin::is_expired(parcel.expires_at, now) {
        record_pickup_failure(
            &state,
            action_codes::USER_PICKUP_PIN_EXPIRED,
            Some(parcel.id),
            "PIN expired",
        )
        .await;
        return Err(CoreError::PickupRejected.into());
    }

    if !pin::verify(
        &input.pin,
        &parcel.pin_salt,
        &parcel.pin_hash,
        parcel.pin_kdf_iterations as u32,
    ) {
        record_pickup_failure(
            &state,
            action_codes::USER_PICKUP_INVALID_PIN,
            Some(parcel.id),
            "PIN mismatch",
        )
        .await;
        return Err(CoreError::PickupRejected.into());
    }

    let locker_id = assigned_locker_id(&parcel)?;

    // Release: parcel -> picked_up, locker -> free unless an admin moved
    // it out of service mid-flight.
    let updated = ParcelRepo::transition_with_locker(
        &state.pool,
        parcel.id,
        ParcelStatus::Deposited.id(),
        ParcelStatus::PickedUp.id(),
        locker_id,
        LockerStatus::Free.id(),
        Some(LockerStatus::Occupied.id()),
    )
    .await?;

    // A concurrent pickup may have won the race after our checks.
    let Some(updated) = updated else {
        record_pickup_failure(
            &state,
            action_codes::USER_PICKUP_UNKNOWN_PARCEL,
            Some(parcel.id),
            "parcel no longer awaiting pickup",
        )
        .await;
        return Err(CoreError::PickupRejected.into());
    };

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::USER_PICKUP_SUCCESS,
            category: Category::UserAction,
            severity: Severity::Low,
            actor: Some(updated.recipient_email.clone()),
            parcel_id: Some(updated.id),
            locker_id: Some(locker_id),
            details: None,
        })
        .await;

    Ok(Json(DataResponse {
        data: PickupResponse {
            parcel_id: updated.id,
            locker_id,
            status: ParcelStatus::PickedUp.as_str(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Retract
// ---------------------------------------------------------------------------

/// POST /api/v1/deposit/{parcel_id}/retract
///
/// Sender-initiated undo while the parcel is still deposited. The locker
/// is freed unless it was separately taken out of service.
pub async fn retract(
    State(state): State<AppState>,
    Path(parcel_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parcel = must_find_parcel(&state, parcel_id).await?;
    let status = parcel_status(&parcel)?;
    status
        .check_transition(ParcelStatus::RetractedBySender)
        .map_err(AppError::Core)?;

    let locker_id = assigned_locker_id(&parcel)?;

    let updated = ParcelRepo::transition_with_locker(
        &state.pool,
        parcel.id,
        status.id(),
        ParcelStatus::RetractedBySender.id(),
        locker_id,
        LockerStatus::Free.id(),
        Some(LockerStatus::Occupied.id()),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "parcel is no longer awaiting pickup".into(),
        ))
    })?;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::USER_RETRACT,
            category: Category::UserAction,
            severity: Severity::Low,
            actor: Some(updated.recipient_email.clone()),
            parcel_id: Some(updated.id),
            locker_id: Some(locker_id),
            details: None,
        })
        .await;

    Ok(Json(DataResponse {
        data: ParcelStatusResponse {
            parcel_id: updated.id,
            status: ParcelStatus::RetractedBySender.as_str(),
        },
    }))
}

// ---------------------------------------------------------------------------
// PIN reissue
// ---------------------------------------------------------------------------

/// POST /api/v1/parcel/{parcel_id}/reissue-pin
///
/// Generate a replacement PIN for a deposited parcel, invalidating the
/// previous one. Limited to three generations per rolling 24h window
/// (the deposit-time generation counts as the first).
pub async fn reissue_pin(
    State(state): State<AppState>,
    Path(parcel_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parcel = must_find_parcel(&state, parcel_id).await?;
    if parcel_status(&parcel)? != ParcelStatus::Deposited {
        return Err(CoreError::Conflict("parcel is no longer awaiting pickup".into()).into());
    }

    let now = Utc::now();
    let decision = pin::check_reissue(
        parcel.pin_window_started_at,
        parcel.pin_generation_count,
        now,
    );

    let (generation_count, window_started_at) = match decision {
        ReissueDecision::RateLimited => {
            state
                .audit
                .record(AuditEntry {
                    action_code: action_codes::USER_PIN_REISSUE_RATE_LIMITED,
                    category: Category::SecurityEvent,
                    severity: Severity::Medium,
                    actor: Some(parcel.recipient_email.clone()),
                    parcel_id: Some(parcel.id),
                    locker_id: parcel.locker_id,
                    details: Some(serde_json::json!({
                        "generation_count": parcel.pin_generation_count,
                    })),
                })
                .await;
            return Err(CoreError::RateLimited.into());
        }
        ReissueDecision::Allowed { reset_window: true } => (1, now),
        ReissueDecision::Allowed {
            reset_window: false,
        } => (
            parcel.pin_generation_count + 1,
            parcel.pin_window_started_at,
        ),
    };

    let generated = pin::generate(
        chrono::Duration::hours(state.config.pin_ttl_hours),
        state.config.pin_kdf_iterations,
        now,
    );
    let material = PinMaterial {
        pin_hash: generated.hash_hex.clone(),
        pin_salt: generated.salt_hex.clone(),
        pin_kdf_iterations: state.config.pin_kdf_iterations as i32,
        pin_generated_at: generated.generated_at,
        expires_at: generated.expires_at,
    };

    let updated = ParcelRepo::set_pin(
        &state.pool,
        parcel.id,
        &material,
        generation_count,
        window_started_at,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "parcel is no longer awaiting pickup".into(),
        ))
    })?;

    let locker_id = assigned_locker_id(&updated)?;
    let location = LockerRepo::find_by_id(&state.pool, locker_id)
        .await?
        .map(|l| l.location)
        .unwrap_or_else(|| "unknown location".to_string());

    let (subject, body) =
        messages::pin_reissue(&location, &generated.plaintext, generated.expires_at);
    send_pin_email(&state, &updated, locker_id, &subject, &body).await;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::USER_PIN_REISSUE,
            category: Category::UserAction,
            severity: Severity::Low,
            actor: Some(updated.recipient_email.clone()),
            parcel_id: Some(updated.id),
            locker_id: Some(locker_id),
            details: Some(serde_json::json!({ "generation_count": generation_count })),
        })
        .await;

    Ok(Json(DataResponse {
        data: ReissueResponse {
            parcel_id: updated.id,
            pin: generated.plaintext,
            expires_at: generated.expires_at,
        },
    }))
}

// ---------------------------------------------------------------------------
// Pickup dispute
// ---------------------------------------------------------------------------

/// POST /api/v1/pickup/{parcel_id}/dispute
///
/// Recipient signals a pickup irregularity (wrong contents, empty
/// locker). The locker is quarantined as `disputed_contents` until an
/// admin resolves it.
pub async fn dispute_pickup(
    State(state): State<AppState>,
    Path(parcel_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parcel = must_find_parcel(&state, parcel_id).await?;
    let status = parcel_status(&parcel)?;
    status
        .check_transition(ParcelStatus::PickupDisputed)
        .map_err(AppError::Core)?;

    let locker_id = assigned_locker_id(&parcel)?;

    let updated = ParcelRepo::transition_with_locker(
        &state.pool,
        parcel.id,
        status.id(),
        ParcelStatus::PickupDisputed.id(),
        locker_id,
        LockerStatus::DisputedContents.id(),
        Some(LockerStatus::Occupied.id()),
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "parcel is no longer awaiting pickup".into(),
        ))
    })?;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::USER_PICKUP_DISPUTE,
            category: Category::UserAction,
            severity: Severity::High,
            actor: Some(updated.recipient_email.clone()),
            parcel_id: Some(updated.id),
            locker_id: Some(locker_id),
            details: None,
        })
        .await;

    Ok(Json(DataResponse {
        data: ParcelStatusResponse {
            parcel_id: updated.id,
            status: ParcelStatus::PickupDisputed.as_str(),
        },
    }))
}

// ---------------------------------------------------------------------------
// Missing report
// ---------------------------------------------------------------------------

/// POST /api/v1/parcel/{parcel_id}/report-missing
///
/// Mark a parcel as missing and force its locker out of service pending
/// inspection. Callable by recipients and admins; the audit category
/// follows the actor, so the endpoint accepts an optional Bearer token.
pub async fn report_missing(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(parcel_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let parcel = must_find_parcel(&state, parcel_id).await?;
    let status = parcel_status(&parcel)?;
    status
        .check_transition(ParcelStatus::Missing)
        .map_err(AppError::Core)?;

    let locker_id = assigned_locker_id(&parcel)?;

    // The locker is forced out of service regardless of its current
    // status; a missing parcel always warrants inspection.
    let updated = ParcelRepo::transition_with_locker(
        &state.pool,
        parcel.id,
        status.id(),
        ParcelStatus::Missing.id(),
        locker_id,
        LockerStatus::OutOfService.id(),
        None,
    )
    .await?
    .ok_or_else(|| {
        AppError::Core(CoreError::Conflict(
            "parcel status changed concurrently".into(),
        ))
    })?;

    let (category, actor) = match claims_from_headers(&headers, &state.config.jwt) {
        Some(claims) if claims.role == ROLE_ADMIN => (
            Category::AdminAction,
            admin_actor(&state, claims.sub).await,
        ),
        _ => (Category::UserAction, updated.recipient_email.clone()),
    };

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::PARCEL_REPORTED_MISSING,
            category,
            severity: Severity::High,
            actor: Some(actor),
            parcel_id: Some(updated.id),
            locker_id: Some(locker_id),
            details: None,
        })
        .await;

    Ok(Json(DataResponse {
        data: ParcelStatusResponse {
            parcel_id: updated.id,
            status: ParcelStatus::Missing.as_str(),
        },
    }))
}

//! Handlers for the `/auth` resource (admin login).

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use parcelhub_core::audit::{action_codes, Category, Severity};
use parcelhub_core::error::CoreError;
use parcelhub_db::models::admin_user::AdminUserResponse;
use parcelhub_db::repositories::AdminUserRepo;
use serde::{Deserialize, Serialize};

use crate::audit::AuditEntry;
use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Maximum consecutive failed login attempts before locking the account.
const MAX_FAILED_ATTEMPTS: i32 = 5;

/// Duration in minutes to lock an account after exceeding failed attempts.
const LOCK_DURATION_MINS: i64 = 15;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful authentication response.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub admin: AdminUserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/login
///
/// Authenticate with username + password. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<LoginResponse>>> {
    // 1. Find the admin by username.
    let admin = AdminUserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid username or password".into(),
            ))
        })?;

    // 2. Check that the account is active.
    if !admin.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    // 3. Check for a temporary lock.
    if let Some(locked_until) = admin.locked_until {
        if locked_until > Utc::now() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Account is temporarily locked. Try again later.".into(),
            )));
        }
    }

    // 4. Verify the password.
    let password_valid = verify_password(&input.password, &admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    if !password_valid {
        // 5. On failure: increment counter, lock past the threshold.
        AdminUserRepo::increment_failed_login(&state.pool, admin.id).await?;

        let new_count = admin.failed_login_count + 1;
        if new_count >= MAX_FAILED_ATTEMPTS {
            let lock_until = Utc::now() + chrono::Duration::minutes(LOCK_DURATION_MINS);
            AdminUserRepo::lock_account(&state.pool, admin.id, lock_until).await?;
        }

        state
            .audit
            .record(AuditEntry {
                action_code: action_codes::ADMIN_LOGIN_FAILED,
                category: Category::SecurityEvent,
                severity: Severity::Medium,
                actor: Some(admin.username.clone()),
                parcel_id: None,
                locker_id: None,
                details: Some(serde_json::json!({ "failed_count": new_count })),
            })
            .await;

        return Err(AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        )));
    }

    // 6. On success: reset failure bookkeeping, stamp last_login_at.
    AdminUserRepo::record_successful_login(&state.pool, admin.id).await?;

    // 7. Issue the access token.
    let access_token = generate_access_token(admin.id, &admin.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    state
        .audit
        .record(AuditEntry {
            action_code: action_codes::ADMIN_LOGIN,
            category: Category::SecurityEvent,
            severity: Severity::Low,
            actor: Some(admin.username.clone()),
            parcel_id: None,
            locker_id: None,
            details: None,
        })
        .await;

    Ok(Json(DataResponse {
        data: LoginResponse {
            access_token,
            expires_in: state.config.jwt.access_token_expiry_mins * 60,
            admin: AdminUserResponse::from(&admin),
        },
    }))
}

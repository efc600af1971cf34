//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use parcelhub_core::error::CoreError;
use parcelhub_core::types::DbId;

use crate::auth::jwt::{validate_token, Claims, JwtConfig};
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated admin extracted from a JWT Bearer token in the
/// `Authorization` header.
///
/// Use this as an extractor parameter in any handler that requires
/// authentication:
///
/// ```ignore
/// async fn my_handler(admin: AuthAdmin) -> AppResult<Json<()>> {
///     tracing::info!(admin_id = admin.admin_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    /// The admin's internal database id (from `claims.sub`).
    pub admin_id: DbId,
    /// The admin's username is not in the token; handlers needing it load
    /// the row. The role name travels in the claims.
    pub role: String,
}

impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = claims_from_headers(&parts.headers, &state.config.jwt)
            .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Invalid or missing token".into())))?;

        Ok(AuthAdmin {
            admin_id: claims.sub,
            role: claims.role,
        })
    }
}

/// Extract and validate Bearer-token claims from request headers.
///
/// Returns `None` on a missing header, malformed scheme, or invalid
/// token. Also used directly by handlers that accept optional
/// authentication (for example missing-parcel reports, where the actor
/// determines the audit category).
pub fn claims_from_headers(headers: &HeaderMap, config: &JwtConfig) -> Option<Claims> {
    let auth_header = headers.get("authorization")?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?;
    validate_token(token, config).ok()
}

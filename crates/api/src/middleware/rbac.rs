//! Role-based access control extractors.
//!
//! [`RequireAdmin`] wraps [`AuthAdmin`] and rejects requests whose role is
//! not `admin`, enforcing authorization at the type level.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use parcelhub_core::error::CoreError;

use super::auth::AuthAdmin;
use crate::error::AppError;
use crate::state::AppState;

/// Role name carried in admin JWT claims.
pub const ROLE_ADMIN: &str = "admin";

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(admin): RequireAdmin) -> AppResult<Json<()>> {
///     // admin is guaranteed to hold the admin role here
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthAdmin);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = AuthAdmin::from_request_parts(parts, state).await?;
        if admin.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(admin))
    }
}

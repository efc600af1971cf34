use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No free locker available for size {size}")]
    NoLockerAvailable { size: &'static str },

    #[error("PIN generation limit reached for this parcel")]
    RateLimited,

    /// Pickup failed. The message is intentionally generic; the precise
    /// cause (wrong PIN, expired PIN, unknown parcel) is recorded only in
    /// the audit trail.
    #[error("Pickup could not be completed")]
    PickupRejected,

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

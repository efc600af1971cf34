//! Parcel entity model and DTOs.

use parcelhub_core::parcel::ParcelStatus;
use parcelhub_core::types::{DbId, StatusId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Full parcel row from the `parcels` table.
///
/// Contains the PIN hash and salt -- NEVER serialize this to API responses
/// directly; handlers build dedicated response DTOs.
#[derive(Debug, Clone, FromRow)]
pub struct Parcel {
    pub id: DbId,
    /// The assigned locker while deposited; cleared semantics are soft --
    /// the reference survives resolution for the audit trail.
    pub locker_id: Option<DbId>,
    pub recipient_email: String,
    pub pin_hash: String,
    pub pin_salt: String,
    /// KDF round count used for this parcel's current PIN hash, stored so
    /// verification keeps working across configuration changes.
    pub pin_kdf_iterations: i32,
    pub pin_generated_at: Timestamp,
    pub expires_at: Timestamp,
    pub pin_generation_count: i32,
    pub pin_window_started_at: Timestamp,
    pub reminder_sent_at: Option<Timestamp>,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Parcel {
    /// Decode the status column.
    pub fn status(&self) -> Option<ParcelStatus> {
        ParcelStatus::from_id(self.status_id)
    }
}

/// PIN material written when depositing or reissuing.
///
/// Carries only the derived hash and salt; the plaintext PIN never reaches
/// the persistence layer.
#[derive(Debug, Clone)]
pub struct PinMaterial {
    pub pin_hash: String,
    pub pin_salt: String,
    pub pin_kdf_iterations: i32,
    pub pin_generated_at: Timestamp,
    pub expires_at: Timestamp,
}

/// DTO for creating a parcel as part of a deposit.
#[derive(Debug, Clone)]
pub struct CreateParcel {
    pub recipient_email: String,
    pub pin: PinMaterial,
}

/// Summary of one reminder processing run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReminderRunSummary {
    pub scanned: usize,
    pub sent: usize,
    pub failed: usize,
}

//! Locker entity model and DTOs.

use parcelhub_core::locker::{LockerSize, LockerStatus};
use parcelhub_core::types::{DbId, StatusId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full locker row from the `lockers` table.
///
/// The size and status columns are SMALLINT lookup IDs; use [`Locker::size`]
/// and [`Locker::status`] to decode them into the closed domain enums.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Locker {
    pub id: DbId,
    pub location: String,
    pub size_id: StatusId,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Locker {
    /// Decode the size column. `None` means the row carries an ID outside
    /// the seeded lookup table, which indicates data corruption.
    pub fn size(&self) -> Option<LockerSize> {
        LockerSize::from_id(self.size_id)
    }

    /// Decode the status column.
    pub fn status(&self) -> Option<LockerStatus> {
        LockerStatus::from_id(self.status_id)
    }
}

/// DTO for provisioning a new locker.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocker {
    pub location: String,
    pub size_id: StatusId,
}

/// Filter parameters for listing lockers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LockerFilter {
    pub size_id: Option<StatusId>,
    pub status_id: Option<StatusId>,
}

//! Repository for the `lockers` table.

use parcelhub_core::locker::LockerStatus;
use parcelhub_core::types::{DbId, StatusId};
use sqlx::PgPool;

use crate::models::locker::{CreateLocker, Locker, LockerFilter};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, location, size_id, status_id, created_at, updated_at";

/// Provides CRUD and assignment operations for lockers.
pub struct LockerRepo;

impl LockerRepo {
    /// Provision a new locker, returning the created row.
    ///
    /// New lockers start in the `free` status.
    pub async fn create(pool: &PgPool, input: &CreateLocker) -> Result<Locker, sqlx::Error> {
        let query = format!(
            "INSERT INTO lockers (location, size_id, status_id)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(&input.location)
            .bind(input.size_id)
            .bind(LockerStatus::Free.id())
            .fetch_one(pool)
            .await
    }

    /// Find a locker by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM lockers WHERE id = $1");
        sqlx::query_as::<_, Locker>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List lockers, optionally filtered by size and status, ordered by id.
    pub async fn list(pool: &PgPool, filter: &LockerFilter) -> Result<Vec<Locker>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM lockers
             WHERE ($1::SMALLINT IS NULL OR size_id = $1)
               AND ($2::SMALLINT IS NULL OR status_id = $2)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(filter.size_id)
            .bind(filter.status_id)
            .fetch_all(pool)
            .await
    }

    /// Atomically claim the first free locker of the requested size,
    /// flipping it to `occupied`.
    ///
    /// Runs inside the caller's deposit transaction. `FOR UPDATE SKIP
    /// LOCKED` serializes concurrent deposits targeting the same locker:
    /// of two racing claims, one takes the row lock and the other skips to
    /// the next free locker (or gets `None`). Lowest id wins the tie-break
    /// so assignment order is deterministic.
    pub async fn claim_available(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        size_id: StatusId,
    ) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!(
            "UPDATE lockers
             SET status_id = $1, updated_at = NOW()
             WHERE id = (
                 SELECT id FROM lockers
                 WHERE size_id = $2 AND status_id = $3
                 ORDER BY id ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(LockerStatus::Occupied.id())
            .bind(size_id)
            .bind(LockerStatus::Free.id())
            .fetch_optional(&mut **tx)
            .await
    }

    /// Set a locker's status unconditionally.
    ///
    /// Transition legality is validated by the caller against
    /// [`LockerStatus::can_transition`] before this runs. Returns `None`
    /// if no row with the given `id` exists.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status_id: StatusId,
    ) -> Result<Option<Locker>, sqlx::Error> {
        let query = format!(
            "UPDATE lockers SET status_id = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Locker>(&query)
            .bind(id)
            .bind(status_id)
            .fetch_optional(pool)
            .await
    }
}

//! Repository for the `parcels` table, including the transactional
//! deposit and the combined parcel/locker status transitions.

use parcelhub_core::parcel::ParcelStatus;
use parcelhub_core::types::{DbId, StatusId, Timestamp};
use sqlx::PgPool;

use crate::models::locker::Locker;
use crate::models::parcel::{CreateParcel, Parcel, PinMaterial};
use crate::repositories::LockerRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "\
    id, locker_id, recipient_email, pin_hash, pin_salt, pin_kdf_iterations, \
    pin_generated_at, expires_at, pin_generation_count, pin_window_started_at, \
    reminder_sent_at, status_id, created_at, updated_at";

/// Provides CRUD and workflow operations for parcels.
pub struct ParcelRepo;

impl ParcelRepo {
    /// Create a deposited parcel against a freshly claimed locker, as one
    /// transaction.
    ///
    /// The locker claim and the parcel insert commit or roll back together,
    /// so an occupied locker with no matching parcel is never observable.
    /// Returns `None` when no free locker of the requested size exists.
    pub async fn create_deposit(
        pool: &PgPool,
        size_id: StatusId,
        input: &CreateParcel,
    ) -> Result<Option<(Parcel, Locker)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(locker) = LockerRepo::claim_available(&mut tx, size_id).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO parcels \
                (locker_id, recipient_email, pin_hash, pin_salt, pin_kdf_iterations, \
                 pin_generated_at, expires_at, pin_generation_count, \
                 pin_window_started_at, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 1, $6, $8) \
             RETURNING {COLUMNS}"
        );
        let parcel = sqlx::query_as::<_, Parcel>(&query)
            .bind(locker.id)
            .bind(&input.recipient_email)
            .bind(&input.pin.pin_hash)
            .bind(&input.pin.pin_salt)
            .bind(input.pin.pin_kdf_iterations)
            .bind(input.pin.pin_generated_at)
            .bind(input.pin.expires_at)
            .bind(ParcelStatus::Deposited.id())
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((parcel, locker)))
    }

    /// Find a parcel by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Parcel>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parcels WHERE id = $1");
        sqlx::query_as::<_, Parcel>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply a parcel status change and a locker status change in one
    /// transaction.
    ///
    /// The parcel update is conditional on the parcel still being in
    /// `parcel_from`, which makes concurrent transitions race-safe: the
    /// loser observes `None`. When `locker_only_if` is set, the locker
    /// update applies only while the locker still holds that status -- a
    /// locker moved out-of-service by an admin mid-flight keeps its status.
    pub async fn transition_with_locker(
        pool: &PgPool,
        parcel_id: DbId,
        parcel_from: StatusId,
        parcel_to: StatusId,
        locker_id: DbId,
        locker_to: StatusId,
        locker_only_if: Option<StatusId>,
    ) -> Result<Option<Parcel>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE parcels SET status_id = $3, updated_at = NOW() \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        let parcel = sqlx::query_as::<_, Parcel>(&query)
            .bind(parcel_id)
            .bind(parcel_from)
            .bind(parcel_to)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(parcel) = parcel else {
            tx.rollback().await?;
            return Ok(None);
        };

        match locker_only_if {
            Some(expected) => {
                sqlx::query(
                    "UPDATE lockers SET status_id = $2, updated_at = NOW() \
                     WHERE id = $1 AND status_id = $3",
                )
                .bind(locker_id)
                .bind(locker_to)
                .bind(expected)
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query(
                    "UPDATE lockers SET status_id = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(locker_id)
                .bind(locker_to)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(parcel))
    }

    /// Replace the PIN material for a deposited parcel (reissue).
    ///
    /// `generation_count` and `window_started_at` are the post-decision
    /// counter values (reset or incremented by the caller). Returns `None`
    /// if the parcel does not exist or is no longer deposited.
    pub async fn set_pin(
        pool: &PgPool,
        id: DbId,
        pin: &PinMaterial,
        generation_count: i32,
        window_started_at: Timestamp,
    ) -> Result<Option<Parcel>, sqlx::Error> {
        let query = format!(
            "UPDATE parcels SET \
                pin_hash = $2, pin_salt = $3, pin_kdf_iterations = $4, \
                pin_generated_at = $5, expires_at = $6, \
                pin_generation_count = $7, pin_window_started_at = $8, \
                updated_at = NOW() \
             WHERE id = $1 AND status_id = $9 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Parcel>(&query)
            .bind(id)
            .bind(&pin.pin_hash)
            .bind(&pin.pin_salt)
            .bind(pin.pin_kdf_iterations)
            .bind(pin.pin_generated_at)
            .bind(pin.expires_at)
            .bind(generation_count)
            .bind(window_started_at)
            .bind(ParcelStatus::Deposited.id())
            .fetch_optional(pool)
            .await
    }

    /// Parcels eligible for a pickup reminder: still deposited, created at
    /// or before `cutoff`, no reminder sent yet. Ordered by id for
    /// deterministic processing.
    pub async fn find_reminder_due(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<Parcel>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM parcels \
             WHERE status_id = $1 AND created_at <= $2 AND reminder_sent_at IS NULL \
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Parcel>(&query)
            .bind(ParcelStatus::Deposited.id())
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Record that a reminder went out for a parcel.
    pub async fn mark_reminder_sent(
        pool: &PgPool,
        id: DbId,
        at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE parcels SET reminder_sent_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Count parcels still deposited against a locker.
    ///
    /// Used to reject freeing a locker that an active parcel still
    /// references.
    pub async fn count_deposited_for_locker(
        pool: &PgPool,
        locker_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*)::BIGINT FROM parcels WHERE locker_id = $1 AND status_id = $2",
        )
        .bind(locker_id)
        .bind(ParcelStatus::Deposited.id())
        .fetch_one(pool)
        .await
    }
}

//! Repository for the append-only `audit_events` table.

use parcelhub_core::types::Timestamp;
use sqlx::PgPool;

use crate::models::audit::{AuditEvent, AuditQuery, CreateAuditEvent};

/// Column list for `audit_events` SELECT queries.
const COLUMNS: &str = "\
    id, occurred_at, action_code, category, severity, actor, \
    parcel_id, locker_id, details, created_at";

/// Provides insert and query operations for audit events. There are no
/// update or delete operations: the table is append-only from the
/// application's point of view.
pub struct AuditEventRepo;

impl AuditEventRepo {
    /// Insert a single audit event, returning the created row.
    pub async fn insert(
        pool: &PgPool,
        entry: &CreateAuditEvent,
    ) -> Result<AuditEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_events \
                (action_code, category, severity, actor, parcel_id, locker_id, details) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditEvent>(&query)
            .bind(&entry.action_code)
            .bind(&entry.category)
            .bind(&entry.severity)
            .bind(&entry.actor)
            .bind(entry.parcel_id)
            .bind(entry.locker_id)
            .bind(&entry.details)
            .fetch_one(pool)
            .await
    }

    /// Query audit events with filtering and pagination, newest first.
    pub async fn query(
        pool: &PgPool,
        params: &AuditQuery,
    ) -> Result<Vec<AuditEvent>, sqlx::Error> {
        let limit = params.limit.unwrap_or(50).min(500);
        let offset = params.offset.unwrap_or(0);

        let (where_clause, bind_values, bind_idx) = build_filter(params);

        let query = format!(
            "SELECT {COLUMNS} FROM audit_events {where_clause} \
             ORDER BY occurred_at DESC, id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );

        let q = bind_values
            .iter()
            .fold(sqlx::query_as::<_, AuditEvent>(&query), |q, val| match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            });
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count audit events matching the given filter (pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_filter(params);

        let query = format!("SELECT COUNT(*)::BIGINT FROM audit_events {where_clause}");

        let q = bind_values
            .iter()
            .fold(sqlx::query_scalar::<_, i64>(&query), |q, val| match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
                BindValue::Timestamp(v) => q.bind(*v),
            });
        q.fetch_one(pool).await
    }
}

// ---------------------------------------------------------------------------
// Internal helpers for dynamic query building
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built audit queries.
enum BindValue {
    BigInt(i64),
    Text(String),
    Timestamp(Timestamp),
}

/// Build a WHERE clause and bind values from [`AuditQuery`] parameters.
///
/// Returns `(where_clause, bind_values, next_bind_index)`. The clause is
/// empty when no filters are active, otherwise starts with `WHERE `.
fn build_filter(params: &AuditQuery) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref action_code) = params.action_code {
        conditions.push(format!("action_code = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(action_code.clone()));
    }

    if let Some(ref category) = params.category {
        conditions.push(format!("category = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(category.clone()));
    }

    if let Some(ref severity) = params.severity {
        conditions.push(format!("severity = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(severity.clone()));
    }

    if let Some(parcel_id) = params.parcel_id {
        conditions.push(format!("parcel_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(parcel_id));
    }

    if let Some(locker_id) = params.locker_id {
        conditions.push(format!("locker_id = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(locker_id));
    }

    if let Some(from) = params.from {
        conditions.push(format!("occurred_at >= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(from));
    }

    if let Some(to) = params.to {
        conditions.push(format!("occurred_at <= ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Timestamp(to));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

//! Verification history queries
//!
//! One row per completed run, written after the result artifact has been
//! uploaded. Rows are immutable once inserted.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbResult;

/// A persisted verification run summary
#[derive(Debug, Clone, FromRow)]
pub struct HistoryRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total_uploaded: i64,
    pub duplicates: i64,
    pub unique_count: i64,
    pub verified_count: i64,
    pub file_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new history row
#[derive(Debug, Clone)]
pub struct NewHistoryRecord {
    pub user_id: Uuid,
    pub total_uploaded: i64,
    pub duplicates: i64,
    pub unique_count: i64,
    pub verified_count: i64,
    pub file_path: Option<String>,
}

/// Insert a run summary, returning its id.
pub async fn insert(pool: &PgPool, record: &NewHistoryRecord) -> DbResult<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO verification_history
            (id, user_id, total_uploaded, duplicates, unique_count, verified_count, file_path)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(id)
    .bind(record.user_id)
    .bind(record.total_uploaded)
    .bind(record.duplicates)
    .bind(record.unique_count)
    .bind(record.verified_count)
    .bind(&record.file_path)
    .execute(pool)
    .await?;

    Ok(id)
}

/// List a user's runs, newest first.
pub async fn list_for_user(
    pool: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> DbResult<Vec<HistoryRecord>> {
    let records = sqlx::query_as::<_, HistoryRecord>(
        r#"
        SELECT id, user_id, total_uploaded, duplicates, unique_count,
               verified_count, file_path, created_at
        FROM verification_history
        WHERE user_id = $1
        ORDER BY created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(records)
}

/// Count a user's runs (for pagination).
pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> DbResult<i64> {
    let count: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM verification_history WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    Ok(count.0)
}

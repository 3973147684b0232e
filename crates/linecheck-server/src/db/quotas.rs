//! User quota and balance queries
//!
//! A quota row is read once at the start of a verification run and written
//! exactly once at the end: [`debit`] commits the processed count and the
//! USDT cost together in a single conditional UPDATE. Concurrent runs for
//! the same user can both pass the advisory pre-check, but the conditional
//! UPDATE keeps the stored balance from ever going negative.

use chrono::{DateTime, Utc};
use sqlx::types::BigDecimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbResult;

/// One user's usage snapshot
#[derive(Debug, Clone, FromRow)]
pub struct UserQuota {
    pub id: Uuid,
    pub max_limit: i64,
    pub used: i64,
    pub usdt_balance: BigDecimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserQuota {
    /// Verifications still available before the cap.
    pub fn tokens_left(&self) -> i64 {
        (self.max_limit - self.used).max(0)
    }

    /// Whether the usage cap has been reached.
    pub fn limit_reached(&self) -> bool {
        self.used >= self.max_limit
    }
}

/// Fetch a user's quota row, or `None` for an unknown user.
pub async fn get_quota(pool: &PgPool, user_id: Uuid) -> DbResult<Option<UserQuota>> {
    let quota = sqlx::query_as::<_, UserQuota>(
        r#"
        SELECT id, max_limit, used, usdt_balance, created_at, updated_at
        FROM user_quotas
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(quota)
}

/// Commit a run's usage and cost in one write.
///
/// Returns the updated row, or `None` when the balance could not cover
/// `cost` (no row matched the condition; nothing was written).
pub async fn debit(
    pool: &PgPool,
    user_id: Uuid,
    processed: i64,
    cost: &BigDecimal,
) -> DbResult<Option<UserQuota>> {
    let updated = sqlx::query_as::<_, UserQuota>(
        r#"
        UPDATE user_quotas
        SET used = used + $2,
            usdt_balance = usdt_balance - $3,
            updated_at = NOW()
        WHERE id = $1 AND usdt_balance >= $3
        RETURNING id, max_limit, used, usdt_balance, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(processed)
    .bind(cost)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

//! Get quota query

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::quotas;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQuotaQuery {
    pub user_id: Uuid,
}

/// A user's usage and balance snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetQuotaResponse {
    pub user_id: Uuid,
    pub max_limit: i64,
    pub used: i64,

    /// `max_limit - used`, floored at zero.
    pub tokens_left: i64,

    /// Decimal string; balances never pass through floats.
    pub usdt_balance: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GetQuotaError {
    #[error("User '{0}' not found")]
    NotFound(Uuid),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}

impl Request<Result<GetQuotaResponse, GetQuotaError>> for GetQuotaQuery {}

impl crate::cqrs::Query for GetQuotaQuery {}

#[tracing::instrument(skip(pool), fields(user_id = %query.user_id))]
pub async fn handle(pool: PgPool, query: GetQuotaQuery) -> Result<GetQuotaResponse, GetQuotaError> {
    let quota = quotas::get_quota(&pool, query.user_id)
        .await?
        .ok_or(GetQuotaError::NotFound(query.user_id))?;

    Ok(GetQuotaResponse {
        user_id: quota.id,
        max_limit: quota.max_limit,
        used: quota.used,
        tokens_left: quota.tokens_left(),
        usdt_balance: quota.usdt_balance.to_string(),
    })
}

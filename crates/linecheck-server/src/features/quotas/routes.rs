//! Quota API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/quotas/:user_id` - Usage and balance snapshot

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};

use super::queries::{GetQuotaError, GetQuotaQuery};

pub fn quotas_routes() -> Router<PgPool> {
    Router::new().route("/:user_id", get(get_quota))
}

/// Get a user's quota snapshot
///
/// # Endpoint
///
/// `GET /api/v1/quotas/:user_id`
///
/// # Response
///
/// - `200 OK` - Usage, remaining tokens, and balance
/// - `404 Not Found` - Unknown user
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(pool), fields(user_id = %user_id))]
async fn get_quota(
    State(pool): State<PgPool>,
    Path(user_id): Path<Uuid>,
) -> Result<Response, QuotaApiError> {
    let response = super::queries::get_quota::handle(pool, GetQuotaQuery { user_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

#[derive(Debug)]
enum QuotaApiError {
    GetError(GetQuotaError),
}

impl From<GetQuotaError> for QuotaApiError {
    fn from(err: GetQuotaError) -> Self {
        Self::GetError(err)
    }
}

impl IntoResponse for QuotaApiError {
    fn into_response(self) -> Response {
        match self {
            QuotaApiError::GetError(GetQuotaError::NotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            QuotaApiError::GetError(GetQuotaError::Database(_)) => {
                tracing::error!("Database error during quota retrieval: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for QuotaApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetError(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_construct() {
        let router = quotas_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}

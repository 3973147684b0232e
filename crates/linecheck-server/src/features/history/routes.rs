//! History API routes
//!
//! # Route Structure
//!
//! - `GET /api/v1/history/:user_id` - Past runs with download links

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::shared::pagination::PaginationParams;
use crate::features::FeatureState;

use super::queries::{ListRunsError, ListRunsQuery};

pub fn history_routes() -> Router<FeatureState> {
    Router::new().route("/:user_id", get(list_runs))
}

/// List a user's past verification runs
///
/// # Endpoint
///
/// `GET /api/v1/history/:user_id?page=1&per_page=20`
///
/// # Response
///
/// - `200 OK` - Runs (newest first) with pagination metadata
/// - `400 Bad Request` - Invalid pagination parameters
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(state, pagination), fields(user_id = %user_id))]
async fn list_runs(
    State(state): State<FeatureState>,
    Path(user_id): Path<Uuid>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Response, HistoryApiError> {
    let query = ListRunsQuery {
        user_id,
        pagination,
    };

    let response = super::queries::list_runs::handle(state, query).await?;

    tracing::debug!(
        count = response.items.len(),
        total = response.pagination.total,
        "History listed via API"
    );

    let meta = json!({ "pagination": response.pagination });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.items, meta)))
            .into_response(),
    )
}

#[derive(Debug)]
enum HistoryApiError {
    ListError(ListRunsError),
}

impl From<ListRunsError> for HistoryApiError {
    fn from(err: ListRunsError) -> Self {
        Self::ListError(err)
    }
}

impl IntoResponse for HistoryApiError {
    fn into_response(self) -> Response {
        match self {
            HistoryApiError::ListError(ListRunsError::InvalidPagination(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            HistoryApiError::ListError(ListRunsError::Database(_)) => {
                tracing::error!("Database error during history listing: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for HistoryApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ListError(e) => write!(f, "{}", e),
        }
    }
}

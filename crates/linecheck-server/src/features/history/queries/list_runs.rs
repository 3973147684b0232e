//! List verification runs query
//!
//! Pages through a user's past runs, newest first, attaching a presigned
//! download URL to every run whose artifact is still in storage. A failed
//! presign downgrades that run's link to `null` rather than failing the
//! whole page.

use chrono::{DateTime, Utc};
use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::history;
use crate::features::shared::pagination::{Paginated, PaginationParams};
use crate::features::FeatureState;
use crate::storage::DOWNLOAD_URL_TTL;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListRunsQuery {
    pub user_id: Uuid,

    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// One past verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub id: Uuid,
    pub total_uploaded: i64,
    pub duplicates: i64,
    pub unique_count: i64,
    pub verified_count: i64,

    /// Presigned download link; `null` when the run produced no artifact
    /// or the link could not be generated.
    pub file_url: Option<String>,

    pub created_at: DateTime<Utc>,
}

pub type ListRunsResponse = Paginated<RunSummary>;

#[derive(Debug, thiserror::Error)]
pub enum ListRunsError {
    #[error("{0}")]
    InvalidPagination(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}

impl Request<Result<ListRunsResponse, ListRunsError>> for ListRunsQuery {}

impl crate::cqrs::Query for ListRunsQuery {}

#[tracing::instrument(
    skip(state, query),
    fields(user_id = %query.user_id, page = ?query.pagination.page)
)]
pub async fn handle(
    state: FeatureState,
    query: ListRunsQuery,
) -> Result<ListRunsResponse, ListRunsError> {
    query
        .pagination
        .validate()
        .map_err(ListRunsError::InvalidPagination)?;

    let records = history::list_for_user(
        &state.db,
        query.user_id,
        query.pagination.per_page(),
        query.pagination.offset(),
    )
    .await?;
    let total = history::count_for_user(&state.db, query.user_id).await?;

    let mut items = Vec::with_capacity(records.len());
    for record in records {
        let file_url = match &record.file_path {
            Some(key) => match state
                .storage
                .generate_presigned_url(key, DOWNLOAD_URL_TTL)
                .await
            {
                Ok(url) => Some(url),
                Err(error) => {
                    tracing::warn!(key = %key, error = %error, "Failed to presign artifact URL");
                    None
                },
            },
            None => None,
        };

        items.push(RunSummary {
            id: record.id,
            total_uploaded: record.total_uploaded,
            duplicates: record.duplicates,
            unique_count: record.unique_count,
            verified_count: record.verified_count,
            file_url,
            created_at: record.created_at,
        });
    }

    Ok(Paginated::from_items(items, &query.pagination, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pagination_is_rejected_before_any_io() {
        let query = ListRunsQuery {
            user_id: Uuid::new_v4(),
            pagination: PaginationParams::new(Some(0), None),
        };

        assert!(query.pagination.validate().is_err());
    }
}

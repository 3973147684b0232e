//! Verification API routes
//!
//! # Route Structure
//!
//! - `POST /api/v1/verify/bulk` - Verify an uploaded number list (multipart)
//! - `POST /api/v1/verify/number` - Verify a single number (JSON)

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use crate::ingest::IngestError;

use super::commands::{
    VerifyBulkCommand, VerifyBulkError, VerifySingleCommand, VerifySingleError,
};

/// Uploads are capped at 25 MiB; a million-row CSV stays well under this.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

pub fn verification_routes() -> Router<FeatureState> {
    Router::new()
        .route("/bulk", post(verify_bulk))
        .route("/number", post(verify_single))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// Verify an uploaded list of phone numbers
///
/// # Endpoint
///
/// `POST /api/v1/verify/bulk`
///
/// Multipart fields: `userId` (required), `countryCode` (optional),
/// `file` (required; the filename extension selects the parser).
///
/// # Response
///
/// - `200 OK` - Run summary with a presigned artifact link
/// - `400 Bad Request` - Missing fields or unsupported file format
/// - `403 Forbidden` - Limit exceeded or insufficient balance
/// - `404 Not Found` - Unknown user
/// - `500 Internal Server Error` - Storage or database failure
#[tracing::instrument(skip(state, multipart))]
async fn verify_bulk(
    State(state): State<FeatureState>,
    mut multipart: Multipart,
) -> Result<Response, VerificationApiError> {
    let mut user_id: Option<String> = None;
    let mut country_code: Option<String> = None;
    let mut filename: Option<String> = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| VerificationApiError::Multipart(e.to_string()))?
    {
        match field.name().unwrap_or("") {
            "userId" => {
                user_id = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| VerificationApiError::Multipart(e.to_string()))?,
                );
            },
            "countryCode" => {
                country_code = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| VerificationApiError::Multipart(e.to_string()))?,
                );
            },
            "file" => {
                filename = field.file_name().map(|s| s.to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| VerificationApiError::Multipart(e.to_string()))?;
                content = Some(data.to_vec());
            },
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            },
        }
    }

    let command = VerifyBulkCommand {
        user_id: user_id.ok_or(VerificationApiError::MissingField("userId"))?,
        country_code,
        filename: filename.ok_or(VerificationApiError::MissingField("file"))?,
        content: content.ok_or(VerificationApiError::MissingField("file"))?,
    };

    let response = super::commands::verify_bulk::handle(state, command).await?;

    tracing::info!(
        total_uploaded = response.total_uploaded,
        verified = response.verified_count,
        "Bulk verification completed via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

/// Verify a single phone number
///
/// # Endpoint
///
/// `POST /api/v1/verify/number`
///
/// # Request Body
///
/// ```json
/// { "user_id": "…", "number": "5551234567" }
/// ```
///
/// # Response
///
/// - `200 OK` - Validation result and remaining tokens
/// - `400 Bad Request` - Invalid or unformattable number
/// - `403 Forbidden` - Limit exceeded or insufficient balance
/// - `404 Not Found` - Unknown user
/// - `500 Internal Server Error` - Provider or database failure
#[tracing::instrument(skip(state, command), fields(number = %command.number))]
async fn verify_single(
    State(state): State<FeatureState>,
    Json(command): Json<VerifySingleCommand>,
) -> Result<Response, VerificationApiError> {
    let response = super::commands::verify_single::handle(state, command).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for verification API endpoints
#[derive(Debug)]
enum VerificationApiError {
    Multipart(String),
    MissingField(&'static str),
    BulkError(VerifyBulkError),
    SingleError(VerifySingleError),
}

impl From<VerifyBulkError> for VerificationApiError {
    fn from(err: VerifyBulkError) -> Self {
        Self::BulkError(err)
    }
}

impl From<VerifySingleError> for VerificationApiError {
    fn from(err: VerifySingleError) -> Self {
        Self::SingleError(err)
    }
}

impl IntoResponse for VerificationApiError {
    fn into_response(self) -> Response {
        match self {
            VerificationApiError::Multipart(ref message) => {
                let error = ErrorResponse::new(
                    "BAD_UPLOAD",
                    format!("Failed to read multipart upload: {}", message),
                );
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            VerificationApiError::MissingField(field) => {
                let error = ErrorResponse::new(
                    "VALIDATION_ERROR",
                    format!("Multipart field '{}' is required", field),
                );
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },

            // Bulk run errors
            VerificationApiError::BulkError(VerifyBulkError::UserIdValidation(_))
            | VerificationApiError::BulkError(VerifyBulkError::CountryCodeValidation(_))
            | VerificationApiError::BulkError(VerifyBulkError::FilenameValidation(_))
            | VerificationApiError::BulkError(VerifyBulkError::EmptyFile) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            VerificationApiError::BulkError(VerifyBulkError::Ingest(
                IngestError::UnsupportedFormat(_),
            )) => {
                let error = ErrorResponse::new("UNSUPPORTED_FORMAT", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            VerificationApiError::BulkError(VerifyBulkError::Ingest(_)) => {
                let error = ErrorResponse::new("BAD_UPLOAD", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            VerificationApiError::BulkError(VerifyBulkError::UserNotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            VerificationApiError::BulkError(VerifyBulkError::LimitExceeded { .. })
            | VerificationApiError::BulkError(VerifyBulkError::InsufficientBalance(_)) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            VerificationApiError::BulkError(VerifyBulkError::Artifact(_))
            | VerificationApiError::BulkError(VerifyBulkError::ArtifactUpload(_)) => {
                tracing::error!("Artifact error during bulk verification: {}", self);
                let error = ErrorResponse::new("STORAGE_ERROR", "A storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            VerificationApiError::BulkError(VerifyBulkError::Database(_)) => {
                tracing::error!("Database error during bulk verification: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },

            // Single-number errors
            VerificationApiError::SingleError(VerifySingleError::UserIdValidation(_))
            | VerificationApiError::SingleError(VerifySingleError::Unformattable(_))
            | VerificationApiError::SingleError(VerifySingleError::InvalidNumber(_)) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            VerificationApiError::SingleError(VerifySingleError::UserNotFound(_)) => {
                let error = ErrorResponse::new("NOT_FOUND", self.to_string());
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            VerificationApiError::SingleError(VerifySingleError::LimitExceeded { .. })
            | VerificationApiError::SingleError(VerifySingleError::InsufficientBalance) => {
                let error = ErrorResponse::new("FORBIDDEN", self.to_string());
                (StatusCode::FORBIDDEN, Json(error)).into_response()
            },
            VerificationApiError::SingleError(VerifySingleError::ProviderUnavailable) => {
                tracing::error!("Provider failure during single verification");
                let error =
                    ErrorResponse::new("PROVIDER_ERROR", "Validation provider is unavailable");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            VerificationApiError::SingleError(VerifySingleError::Database(_)) => {
                tracing::error!("Database error during single verification: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}

impl std::fmt::Display for VerificationApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Multipart(message) => write!(f, "{}", message),
            Self::MissingField(field) => write!(f, "Field '{}' is required", field),
            Self::BulkError(e) => write!(f, "{}", e),
            Self::SingleError(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_error_names_the_field() {
        let err = VerificationApiError::MissingField("userId");
        assert!(err.to_string().contains("userId"));
    }

    #[test]
    fn routes_construct() {
        let router = verification_routes();
        assert!(format!("{:?}", router).contains("Router"));
    }
}

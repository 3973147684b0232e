//! Bulk verification command
//!
//! The orchestrator for one verification run. A run moves through a fixed
//! sequence of steps: load the caller's quota, ingest the uploaded file,
//! normalize the candidates, verify them in batches against the provider
//! pool, debit the ledger, then upload the result artifact and record the
//! run. Any step can fail the run; nothing after a failed step executes.
//!
//! Two ordering facts matter to callers:
//!
//! - The balance check happens at the debit, after provider calls have
//!   already been made. A caller whose balance cannot cover the run still
//!   causes provider-side spend bounded by their remaining quota.
//! - The debit commits before the artifact upload. An upload failure does
//!   not refund the debit.

use mediator::Request;
use serde::{Deserialize, Serialize};
use sqlx::types::BigDecimal;
use uuid::Uuid;

use crate::db::{history, quotas};
use crate::features::shared::validation::{
    validate_country_code, validate_filename, validate_user_id, CountryCodeValidationError,
    FilenameValidationError, UserIdValidationError,
};
use crate::features::FeatureState;
use crate::ingest::{self, FileFormat, IngestError};
use crate::normalize;
use crate::storage::DOWNLOAD_URL_TTL;
use crate::verify::BatchVerifier;

use super::super::artifact::{self, ArtifactError, ARTIFACT_CONTENT_TYPE};

/// Command to verify an uploaded list of phone numbers
#[derive(Debug, Clone)]
pub struct VerifyBulkCommand {
    /// Raw user id form field; parsed to a UUID during validation.
    pub user_id: String,

    /// Optional dialing country code; the configured default applies when
    /// absent.
    pub country_code: Option<String>,

    /// Uploaded filename; its extension selects the parser.
    pub filename: String,

    /// Uploaded file bytes.
    pub content: Vec<u8>,
}

/// Summary of one completed verification run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyBulkResponse {
    /// Numeric candidates found in the file (blank and non-numeric rows
    /// are invisible to the caller).
    pub total_uploaded: i64,

    /// Candidates dropped as exact duplicates.
    pub duplicates: i64,

    /// Candidates submitted for verification.
    pub unique_count: i64,

    /// Numbers the provider confirmed valid (the billed count).
    pub verified_count: i64,

    /// Presigned download link for the result artifact.
    pub file_url: String,
}

/// Errors that can occur during a bulk verification run
#[derive(Debug, thiserror::Error)]
pub enum VerifyBulkError {
    #[error("{0}")]
    UserIdValidation(#[from] UserIdValidationError),

    #[error("{0}")]
    CountryCodeValidation(#[from] CountryCodeValidationError),

    #[error("{0}")]
    FilenameValidation(#[from] FilenameValidationError),

    #[error("Uploaded file is empty")]
    EmptyFile,

    #[error("{0}")]
    Ingest(#[from] IngestError),

    #[error("User '{0}' not found")]
    UserNotFound(Uuid),

    #[error("Verification limit reached ({used} of {max_limit} used)")]
    LimitExceeded { used: i64, max_limit: i64 },

    #[error("Insufficient balance to cover {0} verified numbers")]
    InsufficientBalance(i64),

    #[error("Failed to render result artifact: {0}")]
    Artifact(#[from] ArtifactError),

    #[error("Failed to upload result artifact: {0}")]
    ArtifactUpload(#[source] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}

impl Request<Result<VerifyBulkResponse, VerifyBulkError>> for VerifyBulkCommand {}

impl crate::cqrs::Command for VerifyBulkCommand {}

/// Validated form of the command's scalar fields.
struct ValidatedFields {
    user_id: Uuid,
    country_code: Option<String>,
}

impl VerifyBulkCommand {
    /// Validates the command parameters
    fn validate(&self) -> Result<ValidatedFields, VerifyBulkError> {
        let user_id = validate_user_id(&self.user_id)?;
        validate_filename(&self.filename)?;

        let country_code = self
            .country_code
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(validate_country_code)
            .transpose()?;

        if self.content.is_empty() {
            return Err(VerifyBulkError::EmptyFile);
        }

        Ok(ValidatedFields {
            user_id,
            country_code,
        })
    }
}

/// Handler function for bulk verification runs
///
/// Standalone async function with all run orchestration. The steps run
/// strictly in order; see the module docs for the two ordering caveats
/// around the debit.
#[tracing::instrument(
    skip(state, command),
    fields(filename = %command.filename, bytes = command.content.len())
)]
pub async fn handle(
    state: FeatureState,
    command: VerifyBulkCommand,
) -> Result<VerifyBulkResponse, VerifyBulkError> {
    let fields = command.validate()?;
    let country_code = fields
        .country_code
        .unwrap_or_else(|| state.verification.default_country_code.clone());

    // Load the quota snapshot once; it is not re-read during the run.
    let quota = quotas::get_quota(&state.db, fields.user_id)
        .await?
        .ok_or(VerifyBulkError::UserNotFound(fields.user_id))?;

    if quota.limit_reached() {
        return Err(VerifyBulkError::LimitExceeded {
            used: quota.used,
            max_limit: quota.max_limit,
        });
    }

    let format = FileFormat::from_filename(&command.filename)?;
    let candidates = ingest::ingest(&command.content, format)?;

    let normalized = normalize::normalize(&candidates);
    tracing::info!(
        total = normalized.total_count,
        unique = normalized.unique.len(),
        duplicates = normalized.duplicate_count,
        "Upload normalized"
    );

    // An empty unique set is not an error: the run proceeds with zero
    // provider calls and a zero debit.
    let verifier = BatchVerifier::new(state.providers.clone(), state.verification.batch_size);
    let report = verifier
        .verify_all(&normalized.unique, &country_code, quota.used, quota.max_limit)
        .await;

    let processed = report.processed() as i64;
    let cost = BigDecimal::from(processed) * &state.verification.unit_cost;

    // Provider cost for the run is already incurred at this point; the
    // balance check gates only the debit, matching the historical
    // contract. The conditional UPDATE keeps the stored balance from
    // going negative even under concurrent runs.
    let debited = quotas::debit(&state.db, fields.user_id, processed, &cost)
        .await?
        .ok_or(VerifyBulkError::InsufficientBalance(processed))?;

    tracing::info!(
        processed,
        %cost,
        balance = %debited.usdt_balance,
        "Run debited"
    );

    // Debit is committed; an upload failure past this point is not
    // compensated.
    let run_id = Uuid::new_v4();
    let key = state.storage.verification_key(fields.user_id, run_id);
    let bytes = artifact::render_csv(&report.results)?;

    state
        .storage
        .upload(&key, bytes, Some(ARTIFACT_CONTENT_TYPE.to_string()))
        .await
        .map_err(VerifyBulkError::ArtifactUpload)?;

    history::insert(
        &state.db,
        &history::NewHistoryRecord {
            user_id: fields.user_id,
            total_uploaded: normalized.total_count as i64,
            duplicates: normalized.duplicate_count as i64,
            unique_count: normalized.unique.len() as i64,
            verified_count: processed,
            file_path: Some(key.clone()),
        },
    )
    .await?;

    let file_url = state
        .storage
        .generate_presigned_url(&key, DOWNLOAD_URL_TTL)
        .await
        .map_err(VerifyBulkError::ArtifactUpload)?;

    Ok(VerifyBulkResponse {
        total_uploaded: normalized.total_count as i64,
        duplicates: normalized.duplicate_count as i64,
        unique_count: normalized.unique.len() as i64,
        verified_count: processed,
        file_url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command() -> VerifyBulkCommand {
        VerifyBulkCommand {
            user_id: Uuid::new_v4().to_string(),
            country_code: Some("+1".to_string()),
            filename: "numbers.csv".to_string(),
            content: b"1234567890\n".to_vec(),
        }
    }

    #[test]
    fn valid_command_passes() {
        let fields = command().validate().unwrap();
        assert_eq!(fields.country_code.as_deref(), Some("+1"));
    }

    #[test]
    fn user_id_must_parse() {
        let mut cmd = command();
        cmd.user_id = "not-a-uuid".to_string();
        assert!(matches!(
            cmd.validate(),
            Err(VerifyBulkError::UserIdValidation(_))
        ));
    }

    #[test]
    fn blank_country_code_falls_back_to_default() {
        let mut cmd = command();
        cmd.country_code = Some("   ".to_string());
        let fields = cmd.validate().unwrap();
        assert!(fields.country_code.is_none());

        let mut cmd = command();
        cmd.country_code = None;
        assert!(cmd.validate().unwrap().country_code.is_none());
    }

    #[test]
    fn malformed_country_code_is_rejected() {
        let mut cmd = command();
        cmd.country_code = Some("abc".to_string());
        assert!(matches!(
            cmd.validate(),
            Err(VerifyBulkError::CountryCodeValidation(_))
        ));
    }

    #[test]
    fn empty_upload_is_rejected() {
        let mut cmd = command();
        cmd.content.clear();
        assert!(matches!(cmd.validate(), Err(VerifyBulkError::EmptyFile)));
    }
}

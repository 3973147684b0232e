//! Single-number verification command
//!
//! Validates one number against the provider pool and debits one unit on
//! success. Shares the quota and balance rules of the bulk run, scaled
//! down to a single verification.

use mediator::Request;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::quotas;
use crate::features::shared::validation::{validate_user_id, UserIdValidationError};
use crate::features::FeatureState;
use crate::providers::{NumberValidator, ProviderOutcome, ValidationResult};

use linecheck_common::phone;

/// Command to verify one phone number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySingleCommand {
    pub user_id: String,

    /// Raw number as entered; formatted into a dial string before the
    /// provider call.
    pub number: String,
}

/// Response for a verified number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySingleResponse {
    pub result: ValidationResult,

    /// Verifications still available after this debit.
    pub tokens_left: i64,
}

/// Errors that can occur when verifying a single number
#[derive(Debug, thiserror::Error)]
pub enum VerifySingleError {
    #[error("{0}")]
    UserIdValidation(#[from] UserIdValidationError),

    #[error("Number '{0}' cannot be formatted into a dialable number")]
    Unformattable(String),

    #[error("User '{0}' not found")]
    UserNotFound(Uuid),

    #[error("Verification limit reached ({used} of {max_limit} used)")]
    LimitExceeded { used: i64, max_limit: i64 },

    #[error("Insufficient balance to verify a number")]
    InsufficientBalance,

    #[error("Number '{0}' is not a valid phone number")]
    InvalidNumber(String),

    #[error("Validation provider is unavailable")]
    ProviderUnavailable,

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),
}

impl Request<Result<VerifySingleResponse, VerifySingleError>> for VerifySingleCommand {}

impl crate::cqrs::Command for VerifySingleCommand {}

impl VerifySingleCommand {
    fn validate(&self) -> Result<Uuid, VerifySingleError> {
        let user_id = validate_user_id(&self.user_id)?;
        Ok(user_id)
    }
}

/// Handler function for single-number verification
#[tracing::instrument(skip(state, command), fields(number = %command.number))]
pub async fn handle(
    state: FeatureState,
    command: VerifySingleCommand,
) -> Result<VerifySingleResponse, VerifySingleError> {
    let user_id = command.validate()?;

    let quota = quotas::get_quota(&state.db, user_id)
        .await?
        .ok_or(VerifySingleError::UserNotFound(user_id))?;

    if quota.limit_reached() {
        return Err(VerifySingleError::LimitExceeded {
            used: quota.used,
            max_limit: quota.max_limit,
        });
    }

    let formatted = phone::format_phone(
        &command.number,
        &state.verification.default_country_code,
    )
    .ok_or_else(|| VerifySingleError::Unformattable(command.number.clone()))?;

    let result = match state.providers.validate(&formatted).await {
        ProviderOutcome::Valid(result) => result,
        ProviderOutcome::Invalid => {
            return Err(VerifySingleError::InvalidNumber(command.number.clone()))
        },
        ProviderOutcome::Failed => return Err(VerifySingleError::ProviderUnavailable),
    };

    // One verified number, one unit of cost.
    let debited = quotas::debit(&state.db, user_id, 1, &state.verification.unit_cost)
        .await?
        .ok_or(VerifySingleError::InsufficientBalance)?;

    tracing::info!(
        number = %result.number,
        line_type = %result.line_type,
        tokens_left = debited.tokens_left(),
        "Number verified"
    );

    Ok(VerifySingleResponse {
        result,
        tokens_left: debited.tokens_left(),
    })
}

//! Validation providers
//!
//! External lookup services answer "is this number real, and what line is
//! it" per number. The pool wraps one HTTP client per configured API key
//! behind a shared round-robin cursor; every call gets exactly one attempt
//! against one credential, with no retry and no failover.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod client;
pub mod pool;

pub use client::{ProviderClient, ProviderError};
pub use pool::ProviderPool;

/// Canonical per-number validation record.
///
/// Field order matches the result-artifact column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub number: String,
    pub valid: bool,
    pub local_format: String,
    pub international_format: String,
    pub country_code: String,
    pub country_name: String,
    pub location: String,
    pub carrier: String,
    pub line_type: String,
}

/// Raw payload returned by the lookup API.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderPayload {
    #[serde(default)]
    pub valid: bool,
    pub number: Option<String>,
    pub local_format: Option<String>,
    pub international_format: Option<String>,
    pub country_code: Option<String>,
    pub country_name: Option<String>,
    pub location: Option<String>,
    pub carrier: Option<String>,
    pub line_type: Option<String>,
}

impl ProviderPayload {
    /// Map into the canonical shape; absent optional fields become empty
    /// strings.
    pub fn into_result(self, requested_number: &str) -> ValidationResult {
        ValidationResult {
            number: self
                .number
                .unwrap_or_else(|| requested_number.to_string()),
            valid: self.valid,
            local_format: self.local_format.unwrap_or_default(),
            international_format: self.international_format.unwrap_or_default(),
            country_code: self.country_code.unwrap_or_default(),
            country_name: self.country_name.unwrap_or_default(),
            location: self.location.unwrap_or_default(),
            carrier: self.carrier.unwrap_or_default(),
            line_type: self.line_type.unwrap_or_default(),
        }
    }
}

/// Outcome of one validation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderOutcome {
    /// The provider confirmed the number and returned its metadata.
    Valid(ValidationResult),
    /// The provider answered, and the number is not real.
    Invalid,
    /// The call failed (network, timeout, or non-2xx). No retry.
    Failed,
}

/// Seam between the batch verifier and whatever answers validation calls.
#[async_trait]
pub trait NumberValidator: Send + Sync {
    async fn validate(&self, number: &str) -> ProviderOutcome;

    /// Pacing to insert between dispatches. `None` means full batch
    /// concurrency.
    fn throttle(&self) -> Option<Duration> {
        None
    }
}

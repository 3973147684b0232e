//! Single-credential HTTP client for the lookup API

use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

use super::ProviderPayload;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One validation-API credential with its own HTTP client.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: String,
    pub(crate) access_key: String,
}

impl ProviderClient {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            access_key: access_key.into(),
        })
    }

    /// Issue one validation call. The configured timeout is the only
    /// deadline; callers treat any error as "unverifiable this attempt".
    #[instrument(skip(self), fields(number = %number))]
    pub async fn validate(&self, number: &str) -> Result<ProviderPayload, ProviderError> {
        let payload = self
            .http
            .get(&self.base_url)
            .query(&[("access_key", self.access_key.as_str()), ("number", number)])
            .send()
            .await?
            .error_for_status()?
            .json::<ProviderPayload>()
            .await?;

        Ok(payload)
    }
}

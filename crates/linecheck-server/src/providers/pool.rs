//! Round-robin credential pool
//!
//! Dispatch advances one position per call regardless of success or
//! failure, and the cursor is shared by every concurrent caller of a run.
//! Under concurrency the assignment of numbers to credentials is therefore
//! non-deterministic, but the per-credential call counts stay balanced.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::{NumberValidator, ProviderClient, ProviderOutcome};
use crate::config::ProviderConfig;

pub struct ProviderPool {
    clients: Vec<ProviderClient>,
    cursor: AtomicUsize,
    single_key_delay: Duration,
}

impl ProviderPool {
    /// Build one client per configured API key.
    pub fn from_config(config: &ProviderConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(
            !config.api_keys.is_empty(),
            "provider pool requires at least one API key"
        );

        let timeout = Duration::from_secs(config.timeout_secs);
        let clients = config
            .api_keys
            .iter()
            .map(|key| ProviderClient::new(config.base_url.clone(), key.clone(), timeout))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            clients,
            cursor: AtomicUsize::new(0),
            single_key_delay: Duration::from_millis(config.single_key_delay_ms),
        })
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Advance the shared cursor and pick the next credential. `fetch_add`
    /// wraps on overflow; the modulo keeps the index in range either way.
    fn next_client(&self) -> &ProviderClient {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        &self.clients[index]
    }
}

#[async_trait]
impl NumberValidator for ProviderPool {
    async fn validate(&self, number: &str) -> ProviderOutcome {
        let client = self.next_client();

        match client.validate(number).await {
            Ok(payload) if payload.valid => ProviderOutcome::Valid(payload.into_result(number)),
            Ok(_) => ProviderOutcome::Invalid,
            Err(error) => {
                tracing::warn!(number = %number, error = %error, "Provider call failed");
                ProviderOutcome::Failed
            },
        }
    }

    fn throttle(&self) -> Option<Duration> {
        if self.clients.len() == 1 && !self.single_key_delay.is_zero() {
            Some(self.single_key_delay)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn pool_config(keys: &[&str]) -> ProviderConfig {
        ProviderConfig {
            base_url: "http://localhost/api/validate".to_string(),
            api_keys: keys.iter().map(|k| k.to_string()).collect(),
            timeout_secs: 5,
            single_key_delay_ms: 0,
        }
    }

    #[test]
    fn pool_requires_a_key() {
        assert!(ProviderPool::from_config(&pool_config(&[])).is_err());
        assert!(ProviderPool::from_config(&pool_config(&["k1"])).is_ok());
    }

    #[test]
    fn dispatch_is_fair_across_credentials() {
        let pool = ProviderPool::from_config(&pool_config(&["k1", "k2", "k3"])).unwrap();

        let mut calls: HashMap<String, usize> = HashMap::new();
        for _ in 0..10 {
            let client = pool.next_client();
            *calls.entry(client.access_key.clone()).or_default() += 1;
        }

        // 10 calls over 3 credentials: each gets floor or ceil of 10/3
        assert_eq!(calls.len(), 3);
        assert!(calls.values().all(|&n| n == 3 || n == 4));
        assert_eq!(calls.values().sum::<usize>(), 10);
    }

    #[test]
    fn throttle_applies_only_to_single_key_pools() {
        let mut config = pool_config(&["k1"]);
        config.single_key_delay_ms = 250;
        let single = ProviderPool::from_config(&config).unwrap();
        assert_eq!(single.throttle(), Some(Duration::from_millis(250)));

        let mut config = pool_config(&["k1", "k2"]);
        config.single_key_delay_ms = 250;
        let multi = ProviderPool::from_config(&config).unwrap();
        assert_eq!(multi.throttle(), None);

        let quiet = ProviderPool::from_config(&pool_config(&["k1"])).unwrap();
        assert_eq!(quiet.throttle(), None);
    }

    #[test]
    fn cursor_survives_wrapping_past_usize_max() {
        let pool = ProviderPool::from_config(&pool_config(&["k1", "k2", "k3"])).unwrap();
        pool.cursor.store(usize::MAX - 1, Ordering::Relaxed);

        // fetch_add wraps; the modulo keeps every pick in range
        for _ in 0..6 {
            let _ = pool.next_client();
        }
    }

    #[tokio::test]
    async fn outcomes_map_from_provider_responses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/valid"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "valid": true,
                "number": "15551234567",
                "line_type": "mobile"
            })))
            .mount(&server)
            .await;

        let mut config = pool_config(&["k1"]);
        config.base_url = format!("{}/valid", server.uri());
        let pool = ProviderPool::from_config(&config).unwrap();

        match pool.validate("+15551234567").await {
            ProviderOutcome::Valid(result) => {
                assert_eq!(result.line_type, "mobile");
            },
            other => panic!("expected Valid, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn confirmed_invalid_numbers_are_not_failures() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": false })))
            .mount(&server)
            .await;

        let mut config = pool_config(&["k1"]);
        config.base_url = server.uri();
        let pool = ProviderPool::from_config(&config).unwrap();

        assert_eq!(pool.validate("+15550000000").await, ProviderOutcome::Invalid);
    }

    #[tokio::test]
    async fn transport_errors_become_failed() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut config = pool_config(&["k1"]);
        config.base_url = server.uri();
        let pool = ProviderPool::from_config(&config).unwrap();

        assert_eq!(pool.validate("+15550000000").await, ProviderOutcome::Failed);
    }
}

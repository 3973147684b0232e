//! Batched concurrent verification
//!
//! Numbers are processed in fixed-size batches. Batches run strictly one
//! after another; inside a batch every member is formatted and validated
//! concurrently, which caps peak in-flight provider calls at the batch
//! size. A shared counter enforces the usage cap: the check is advisory (a
//! racy read against concurrently completing members), so a run can
//! overshoot the cap by at most one batch width. That overshoot is accepted
//! behavior, not a bug.

use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use linecheck_common::phone;

use crate::providers::{NumberValidator, ProviderOutcome, ValidationResult};

/// Per-number outcome, tallied into the [`BatchReport`].
#[derive(Debug)]
enum NumberOutcome {
    Valid(ValidationResult),
    InvalidNumber,
    ProviderError,
    Unformattable,
    QuotaExhausted,
}

/// Aggregate outcome of one run's verification phase.
///
/// `results` holds confirmed-valid numbers in completion order; callers
/// must not assume it matches the input order. Everything else is a count:
/// per-number failures are never itemized for the caller.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<ValidationResult>,
    pub invalid: usize,
    pub provider_errors: usize,
    pub unformattable: usize,
    pub skipped: usize,
}

impl BatchReport {
    /// Numbers that verified successfully (the billable count).
    pub fn processed(&self) -> usize {
        self.results.len()
    }

    fn record(&mut self, outcome: NumberOutcome) {
        match outcome {
            NumberOutcome::Valid(result) => self.results.push(result),
            NumberOutcome::InvalidNumber => self.invalid += 1,
            NumberOutcome::ProviderError => self.provider_errors += 1,
            NumberOutcome::Unformattable => self.unformattable += 1,
            NumberOutcome::QuotaExhausted => self.skipped += 1,
        }
    }
}

pub struct BatchVerifier<V> {
    validator: Arc<V>,
    batch_size: usize,
}

impl<V: NumberValidator> BatchVerifier<V> {
    pub fn new(validator: Arc<V>, batch_size: usize) -> Self {
        Self {
            validator,
            batch_size: batch_size.max(1),
        }
    }

    /// Verify `numbers` in sequential batches, bounded by the caller's
    /// remaining quota (`max_limit - already_used`).
    #[tracing::instrument(skip_all, fields(numbers = numbers.len(), batch_size = self.batch_size))]
    pub async fn verify_all(
        &self,
        numbers: &[String],
        default_country_code: &str,
        already_used: i64,
        max_limit: i64,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        let processed = AtomicI64::new(0);

        for batch in numbers.chunks(self.batch_size) {
            if let Some(delay) = self.validator.throttle() {
                // Single effective credential: dispatch sequentially with
                // pacing to stay under the upstream rate limit.
                for number in batch {
                    let outcome = self
                        .verify_one(number, default_country_code, &processed, already_used, max_limit)
                        .await;
                    report.record(outcome);
                    tokio::time::sleep(delay).await;
                }
            } else {
                let mut futures: Vec<
                    std::pin::Pin<Box<dyn std::future::Future<Output = NumberOutcome> + Send + '_>>,
                > = Vec::with_capacity(batch.len());
                for number in batch {
                    futures.push(Box::pin(self.verify_one(
                        number,
                        default_country_code,
                        &processed,
                        already_used,
                        max_limit,
                    )));
                }
                let mut outcomes = stream::iter(futures).buffer_unordered(batch.len());

                while let Some(outcome) = outcomes.next().await {
                    report.record(outcome);
                }
            }
        }

        tracing::info!(
            verified = report.results.len(),
            invalid = report.invalid,
            provider_errors = report.provider_errors,
            unformattable = report.unformattable,
            skipped = report.skipped,
            "Verification finished"
        );

        report
    }

    async fn verify_one(
        &self,
        number: &str,
        default_country_code: &str,
        processed: &AtomicI64,
        already_used: i64,
        max_limit: i64,
    ) -> NumberOutcome {
        // Advisory cap check against a counter that concurrent batch
        // members increment mid-flight.
        if already_used + processed.load(Ordering::Relaxed) >= max_limit {
            return NumberOutcome::QuotaExhausted;
        }

        let Some(formatted) = phone::format_phone(number, default_country_code) else {
            return NumberOutcome::Unformattable;
        };

        match self.validator.validate(&formatted).await {
            ProviderOutcome::Valid(result) => {
                processed.fetch_add(1, Ordering::Relaxed);
                NumberOutcome::Valid(result)
            },
            ProviderOutcome::Invalid => NumberOutcome::InvalidNumber,
            ProviderOutcome::Failed => NumberOutcome::ProviderError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn valid_result(number: &str) -> ValidationResult {
        ValidationResult {
            number: number.to_string(),
            valid: true,
            local_format: String::new(),
            international_format: number.to_string(),
            country_code: "US".to_string(),
            country_name: "United States of America".to_string(),
            location: String::new(),
            carrier: "Test Carrier".to_string(),
            line_type: "mobile".to_string(),
        }
    }

    /// Scripted stand-in for the provider pool.
    struct ScriptedValidator {
        outcomes: HashMap<String, ProviderOutcome>,
        calls: AtomicUsize,
        throttle: Option<Duration>,
    }

    impl ScriptedValidator {
        fn new(outcomes: HashMap<String, ProviderOutcome>) -> Self {
            Self {
                outcomes,
                calls: AtomicUsize::new(0),
                throttle: None,
            }
        }

        fn all_valid() -> Self {
            Self::new(HashMap::new())
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NumberValidator for ScriptedValidator {
        async fn validate(&self, number: &str) -> ProviderOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcomes
                .get(number)
                .cloned()
                .unwrap_or_else(|| ProviderOutcome::Valid(valid_result(number)))
        }

        fn throttle(&self) -> Option<Duration> {
            self.throttle
        }
    }

    fn numbers(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn valid_numbers_are_collected() {
        let validator = Arc::new(ScriptedValidator::all_valid());
        let verifier = BatchVerifier::new(validator.clone(), 50);

        let report = verifier
            .verify_all(&numbers(&["1234567890", "9876543210"]), "+1", 0, 1000)
            .await;

        assert_eq!(report.processed(), 2);
        assert_eq!(validator.call_count(), 2);
        // Formatting happened before the provider call
        assert!(report.results.iter().all(|r| r.number.starts_with("+1")));
    }

    #[tokio::test]
    async fn unformattable_numbers_never_reach_the_provider() {
        let validator = Arc::new(ScriptedValidator::all_valid());
        let verifier = BatchVerifier::new(validator.clone(), 50);

        // 9 digits: outside every formatting rule
        let report = verifier
            .verify_all(&numbers(&["123456789"]), "+1", 0, 1000)
            .await;

        assert_eq!(report.processed(), 0);
        assert_eq!(report.unformattable, 1);
        assert_eq!(validator.call_count(), 0);
    }

    #[tokio::test]
    async fn quota_skips_numbers_past_the_cap() {
        let validator = Arc::new(ScriptedValidator::all_valid());
        let verifier = BatchVerifier::new(validator.clone(), 50);

        let input = numbers(&[
            "1111111111",
            "2222222222",
            "3333333333",
            "4444444444",
            "5555555555",
        ]);
        let report = verifier.verify_all(&input, "+1", 8, 10).await;

        assert_eq!(report.processed(), 2);
        assert_eq!(report.skipped, 3);
        assert_eq!(validator.call_count(), 2);
    }

    #[tokio::test]
    async fn invalid_and_failed_outcomes_are_tallied_not_collected() {
        let mut outcomes = HashMap::new();
        outcomes.insert("+11111111111".to_string(), ProviderOutcome::Invalid);
        outcomes.insert("+12222222222".to_string(), ProviderOutcome::Failed);

        let validator = Arc::new(ScriptedValidator::new(outcomes));
        let verifier = BatchVerifier::new(validator.clone(), 50);

        let report = verifier
            .verify_all(
                &numbers(&["1111111111", "2222222222", "3333333333"]),
                "+1",
                0,
                1000,
            )
            .await;

        assert_eq!(report.processed(), 1);
        assert_eq!(report.invalid, 1);
        assert_eq!(report.provider_errors, 1);
        // Invalid and failed numbers still consumed a provider call
        assert_eq!(validator.call_count(), 3);
    }

    #[tokio::test]
    async fn small_batches_still_cover_every_number() {
        let validator = Arc::new(ScriptedValidator::all_valid());
        let verifier = BatchVerifier::new(validator.clone(), 2);

        let input = numbers(&[
            "1111111111",
            "2222222222",
            "3333333333",
            "4444444444",
            "5555555555",
        ]);
        let report = verifier.verify_all(&input, "+1", 0, 1000).await;

        assert_eq!(report.processed(), 5);
        assert_eq!(validator.call_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn throttled_pools_process_sequentially() {
        let mut validator = ScriptedValidator::all_valid();
        validator.throttle = Some(Duration::from_millis(100));
        let verifier = BatchVerifier::new(Arc::new(validator), 50);

        let report = verifier
            .verify_all(&numbers(&["1234567890", "9876543210"]), "+1", 0, 1000)
            .await;

        assert_eq!(report.processed(), 2);
    }
}

//! End-to-end pipeline tests
//!
//! Drive the full verification pipeline (ingestion, normalization,
//! batched verification, artifact rendering) against a scripted
//! validator, with no database or object storage involved.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use linecheck_server::features::verification::artifact;
use linecheck_server::ingest::{self, FileFormat};
use linecheck_server::normalize;
use linecheck_server::providers::{NumberValidator, ProviderOutcome, ValidationResult};
use linecheck_server::verify::BatchVerifier;

/// Provider stand-in scripted per formatted number. Unknown numbers fail.
struct ScriptedProvider {
    outcomes: HashMap<String, ProviderOutcome>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    fn new(outcomes: HashMap<String, ProviderOutcome>) -> Self {
        Self {
            outcomes,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NumberValidator for ScriptedProvider {
    async fn validate(&self, number: &str) -> ProviderOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcomes
            .get(number)
            .cloned()
            .unwrap_or(ProviderOutcome::Failed)
    }
}

fn mobile_result(number: &str) -> ValidationResult {
    ValidationResult {
        number: number.to_string(),
        valid: true,
        local_format: number.trim_start_matches("+1").to_string(),
        international_format: number.to_string(),
        country_code: "US".to_string(),
        country_name: "United States of America".to_string(),
        location: String::new(),
        carrier: "Test Carrier".to_string(),
        line_type: "mobile".to_string(),
    }
}

#[tokio::test]
async fn csv_upload_end_to_end() {
    // Two copies of one number, a text row, and a second number.
    let csv = b"1234567890\n1234567890\nnotanumber\n9876543210\n";

    let candidates = ingest::ingest(csv, FileFormat::Csv).unwrap();
    assert_eq!(candidates.len(), 4);

    let normalized = normalize::normalize(&candidates);
    assert_eq!(normalized.total_count, 3, "the text row is filtered before counting");
    assert_eq!(normalized.duplicate_count, 1);
    assert_eq!(normalized.unique, vec!["1234567890", "9876543210"]);

    // First unique number verifies as mobile; the second is rejected by
    // the provider.
    let mut outcomes = HashMap::new();
    outcomes.insert(
        "+11234567890".to_string(),
        ProviderOutcome::Valid(mobile_result("+11234567890")),
    );
    outcomes.insert("+19876543210".to_string(), ProviderOutcome::Invalid);

    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let verifier = BatchVerifier::new(provider.clone(), 50);
    let report = verifier.verify_all(&normalized.unique, "+1", 0, i64::MAX).await;

    assert_eq!(report.processed(), 1);
    assert_eq!(report.invalid, 1);
    assert_eq!(provider.call_count(), 2);

    let bytes = artifact::render_csv(&report.results).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2, "header plus exactly one data row");
    assert!(lines[0].starts_with("number,valid,"));
    assert!(lines[1].starts_with("+11234567890,true,"));
}

#[tokio::test]
async fn txt_upload_with_header_end_to_end() {
    let txt = b"phone\r\n5551230001\r\n5551230001\r\n5551230002";

    let candidates = ingest::ingest(txt, FileFormat::Txt).unwrap();
    assert_eq!(candidates.len(), 3, "the header line is dropped");

    let normalized = normalize::normalize(&candidates);
    assert_eq!(normalized.unique, vec!["5551230001", "5551230002"]);

    let mut outcomes = HashMap::new();
    for number in ["+15551230001", "+15551230002"] {
        outcomes.insert(
            number.to_string(),
            ProviderOutcome::Valid(mobile_result(number)),
        );
    }

    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let verifier = BatchVerifier::new(provider, 50);
    let report = verifier.verify_all(&normalized.unique, "+1", 0, i64::MAX).await;

    assert_eq!(report.processed(), 2);
}

#[tokio::test]
async fn quota_bounds_provider_calls_across_the_run() {
    // 120 distinct numbers, 7 tokens left: the provider sees at most the
    // remaining quota plus one batch width of overshoot.
    let numbers: Vec<String> = (0..120).map(|i| format!("55512{:05}", i)).collect();
    let csv = numbers.join("\n").into_bytes();

    let candidates = ingest::ingest(&csv, FileFormat::Csv).unwrap();
    let normalized = normalize::normalize(&candidates);
    assert_eq!(normalized.unique.len(), 120);

    let mut outcomes = HashMap::new();
    for number in &normalized.unique {
        let formatted = format!("+1{}", number);
        outcomes.insert(
            formatted.clone(),
            ProviderOutcome::Valid(mobile_result(&formatted)),
        );
    }

    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let batch_size = 10;
    let verifier = BatchVerifier::new(provider.clone(), batch_size);

    let used = 93;
    let max_limit = 100;
    let report = verifier.verify_all(&normalized.unique, "+1", used, max_limit).await;

    let remaining = (max_limit - used) as usize;
    assert!(report.processed() >= remaining);
    assert!(
        report.processed() <= remaining + batch_size,
        "overshoot is bounded by one batch width, got {}",
        report.processed()
    );
    assert_eq!(provider.call_count(), report.processed());
    assert_eq!(report.processed() + report.skipped, 120);
}

#[tokio::test]
async fn provider_failures_reduce_counts_without_erroring() {
    let csv = b"5551230001\n5551230002\n5551230003\n";

    let candidates = ingest::ingest(csv, FileFormat::Csv).unwrap();
    let normalized = normalize::normalize(&candidates);

    // Only one of the three numbers is scripted; the others hit the
    // unknown-number path and fail.
    let mut outcomes = HashMap::new();
    outcomes.insert(
        "+15551230002".to_string(),
        ProviderOutcome::Valid(mobile_result("+15551230002")),
    );

    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let verifier = BatchVerifier::new(provider, 50);
    let report = verifier.verify_all(&normalized.unique, "+1", 0, i64::MAX).await;

    assert_eq!(report.processed(), 1);
    assert_eq!(report.provider_errors, 2);

    let bytes = artifact::render_csv(&report.results).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().count(), 2);
}

#[tokio::test]
async fn scientific_notation_survives_the_whole_pipeline() {
    // A spreadsheet-mangled 12-digit number: 9.17858E+11 is 917858000000.
    let csv = b"9.17858E+11\n";

    let candidates = ingest::ingest(csv, FileFormat::Csv).unwrap();
    let normalized = normalize::normalize(&candidates);
    assert_eq!(normalized.unique, vec!["917858000000"]);

    // 12 digits: formatted with a bare leading '+'.
    let mut outcomes = HashMap::new();
    outcomes.insert(
        "+917858000000".to_string(),
        ProviderOutcome::Valid(mobile_result("+917858000000")),
    );

    let provider = Arc::new(ScriptedProvider::new(outcomes));
    let verifier = BatchVerifier::new(provider.clone(), 50);
    let report = verifier.verify_all(&normalized.unique, "+1", 0, i64::MAX).await;

    assert_eq!(report.processed(), 1);
    assert_eq!(provider.call_count(), 1);
}

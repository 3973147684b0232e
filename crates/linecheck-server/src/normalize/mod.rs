//! Candidate normalization
//!
//! Filters out blank and non-numeric candidates, then deduplicates the rest
//! by exact trimmed string equality, first occurrence winning. Dial-string
//! formatting is deliberately NOT applied here; the verifier formats each
//! number lazily right before its provider call (see
//! [`linecheck_common::phone::format_phone`]).

use linecheck_common::phone;

/// Outcome of normalizing one upload's candidates
#[derive(Debug, Clone)]
pub struct NormalizedSet {
    /// Deduplicated candidates in first-occurrence order.
    pub unique: Vec<String>,
    /// Candidates that survived the numeric filter (the caller-visible
    /// `total_uploaded`).
    pub total_count: usize,
    /// `total_count - unique.len()`.
    pub duplicate_count: usize,
}

/// Filter and deduplicate raw candidates.
pub fn normalize(candidates: &[String]) -> NormalizedSet {
    let mut unique = Vec::new();
    let mut seen = std::collections::HashSet::new();
    let mut total_count = 0usize;

    for candidate in candidates {
        if !phone::is_numeric_candidate(candidate) {
            continue;
        }

        total_count += 1;

        let trimmed = candidate.trim();
        if seen.insert(trimmed.to_string()) {
            unique.push(trimmed.to_string());
        }
    }

    let duplicate_count = total_count - unique.len();

    NormalizedSet {
        unique,
        total_count,
        duplicate_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blanks_and_text_are_filtered_before_counting() {
        let set = normalize(&candidates(&[
            "1234567890",
            "1234567890",
            "notanumber",
            "9876543210",
        ]));

        assert_eq!(set.total_count, 3);
        assert_eq!(set.duplicate_count, 1);
        assert_eq!(set.unique, vec!["1234567890", "9876543210"]);
    }

    #[test]
    fn first_occurrence_wins() {
        let set = normalize(&candidates(&["111", " 111 ", "222", "111"]));

        // " 111 " trims to "111" and collapses into the first occurrence
        assert_eq!(set.unique, vec!["111", "222"]);
        assert_eq!(set.total_count, 4);
        assert_eq!(set.duplicate_count, 2);
    }

    #[test]
    fn dedup_is_string_equality_not_phone_equality() {
        // Same phone, different formatting: both survive
        let set = normalize(&candidates(&["+1 (555) 123-4567", "15551234567"]));
        assert_eq!(set.unique.len(), 2);
        assert_eq!(set.duplicate_count, 0);
    }

    #[test]
    fn counts_always_reconcile() {
        let inputs = candidates(&["1", "2", "1", "", "x", "3", "2", "2"]);
        let set = normalize(&inputs);

        assert_eq!(set.unique.len() + set.duplicate_count, set.total_count);
        assert_eq!(set.total_count, 6);
    }

    #[test]
    fn empty_input_yields_empty_set() {
        let set = normalize(&[]);
        assert!(set.unique.is_empty());
        assert_eq!(set.total_count, 0);
        assert_eq!(set.duplicate_count, 0);
    }
}

//! Pure phone-number helpers
//!
//! These functions carry the normalization rules used by the verification
//! pipeline: digit extraction, the numeric-candidate filter, and dial-string
//! formatting. All of them are pure so they can be tested without touching
//! the pipeline.

/// Characters tolerated as phone formatting noise around the digits.
const FORMATTING_CHARS: &[char] = &['+', '-', '(', ')', '.', ' ', '\t'];

/// Strip every non-digit character from `raw`.
pub fn digits_only(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Whether `raw` is a plausible phone candidate: after removing common
/// formatting characters, at least one character remains and all of them
/// are ASCII digits.
///
/// `"(555) 123-4567"` passes; `"notanumber"` and `""` do not.
pub fn is_numeric_candidate(raw: &str) -> bool {
    let mut seen_digit = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            seen_digit = true;
        } else if !FORMATTING_CHARS.contains(&c) {
            return false;
        }
    }
    seen_digit
}

/// Format a candidate into a dial-ready international number.
///
/// The digit-stripped content decides the shape:
/// - exactly 10 digits: prefixed with `default_country_code`
/// - 11 to 13 digits: returned with a leading `+`
/// - anything else: `None` (unformattable, excluded from validation)
///
/// `default_country_code` is expected in `+<digits>` form, e.g. `"+1"`.
pub fn format_phone(raw: &str, default_country_code: &str) -> Option<String> {
    let digits = digits_only(raw);

    match digits.len() {
        10 => Some(format!("{}{}", default_country_code, digits)),
        11..=13 => Some(format!("+{}", digits)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_only_strips_formatting() {
        assert_eq!(digits_only("+1 (555) 123-4567"), "15551234567");
        assert_eq!(digits_only("no digits"), "");
    }

    #[test]
    fn numeric_candidates_accept_formatted_numbers() {
        assert!(is_numeric_candidate("1234567890"));
        assert!(is_numeric_candidate("+44 7700 900123"));
        assert!(is_numeric_candidate("(555) 123-4567"));
    }

    #[test]
    fn numeric_candidates_reject_text_and_blanks() {
        assert!(!is_numeric_candidate("notanumber"));
        assert!(!is_numeric_candidate("12a34"));
        assert!(!is_numeric_candidate(""));
        assert!(!is_numeric_candidate("   "));
        assert!(!is_numeric_candidate("+-()"));
    }

    #[test]
    fn ten_digits_get_country_code() {
        assert_eq!(
            format_phone("1234567890", "+1").as_deref(),
            Some("+11234567890")
        );
        assert_eq!(
            format_phone("(987) 654-3210", "+91").as_deref(),
            Some("+919876543210")
        );
    }

    #[test]
    fn eleven_to_thirteen_digits_keep_their_prefix() {
        assert_eq!(
            format_phone("11234567890", "+1").as_deref(),
            Some("+11234567890")
        );
        assert_eq!(
            format_phone("+447700900123", "+1").as_deref(),
            Some("+447700900123")
        );
        assert_eq!(
            format_phone("8612345678901", "+1").as_deref(),
            Some("+8612345678901")
        );
    }

    #[test]
    fn out_of_range_digit_counts_are_unformattable() {
        assert_eq!(format_phone("123456789", "+1"), None);
        assert_eq!(format_phone("12345678901234", "+1"), None);
        assert_eq!(format_phone("", "+1"), None);
    }

    // The formatted output only ever prepends a prefix; the digit content of
    // the input is never altered.
    #[test]
    fn formatting_preserves_digits() {
        let formatted = format_phone("555-123-4567", "+1").unwrap();
        assert!(formatted.starts_with("+1"));
        assert!(formatted.ends_with("5551234567"));
    }
}

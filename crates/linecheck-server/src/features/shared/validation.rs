//! Shared validation utilities
//!
//! Field-level validation used by commands and queries across slices.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during user-id validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserIdValidationError {
    #[error("User id is required and cannot be empty")]
    Required,

    #[error("User id must be a valid UUID")]
    InvalidFormat,
}

/// Errors that can occur during country-code validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CountryCodeValidationError {
    #[error("Country code '{0}' must be 1-4 digits with an optional leading '+'")]
    InvalidFormat(String),
}

/// Errors that can occur during filename validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilenameValidationError {
    #[error("Filename is required and cannot be empty")]
    Required,

    #[error("Filename must not exceed 255 characters")]
    TooLong,
}

/// Parse a user id field into a UUID.
pub fn validate_user_id(raw: &str) -> Result<Uuid, UserIdValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserIdValidationError::Required);
    }

    Uuid::parse_str(trimmed).map_err(|_| UserIdValidationError::InvalidFormat)
}

/// Validate a dialing country code and normalize it to `+<digits>`.
pub fn validate_country_code(raw: &str) -> Result<String, CountryCodeValidationError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix('+').unwrap_or(trimmed);

    if digits.is_empty()
        || digits.len() > 4
        || !digits.chars().all(|c| c.is_ascii_digit())
    {
        return Err(CountryCodeValidationError::InvalidFormat(raw.to_string()));
    }

    Ok(format!("+{}", digits))
}

/// Validate an uploaded filename.
pub fn validate_filename(filename: &str) -> Result<(), FilenameValidationError> {
    if filename.trim().is_empty() {
        return Err(FilenameValidationError::Required);
    }

    if filename.len() > 255 {
        return Err(FilenameValidationError::TooLong);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_must_be_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(validate_user_id(&id.to_string()).unwrap(), id);
        assert_eq!(
            validate_user_id(&format!("  {}  ", id)).unwrap(),
            id,
            "surrounding whitespace is tolerated"
        );

        assert_eq!(validate_user_id(""), Err(UserIdValidationError::Required));
        assert_eq!(
            validate_user_id("not-a-uuid"),
            Err(UserIdValidationError::InvalidFormat)
        );
    }

    #[test]
    fn country_codes_normalize_to_plus_form() {
        assert_eq!(validate_country_code("+1").unwrap(), "+1");
        assert_eq!(validate_country_code("44").unwrap(), "+44");
        assert_eq!(validate_country_code(" +91 ").unwrap(), "+91");
    }

    #[test]
    fn bad_country_codes_are_rejected() {
        for raw in ["", "+", "12345", "+1a", "us"] {
            assert!(
                matches!(
                    validate_country_code(raw),
                    Err(CountryCodeValidationError::InvalidFormat(_))
                ),
                "'{}' should be invalid",
                raw
            );
        }
    }

    #[test]
    fn filename_length_is_bounded() {
        assert!(validate_filename("numbers.csv").is_ok());
        assert_eq!(validate_filename("  "), Err(FilenameValidationError::Required));
        assert_eq!(
            validate_filename(&"a".repeat(256)),
            Err(FilenameValidationError::TooLong)
        );
    }
}

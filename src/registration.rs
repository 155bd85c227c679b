//! Registration number validation (`2000-AG-1000` format).

use std::sync::LazyLock;

use regex::Regex;

static REGISTRATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-[Aa][Gg]-\d{4}$").unwrap());

/// Message shown next to the field when the format is wrong.
pub const INVALID_REGISTRATION_MESSAGE: &str =
    "Please enter a valid registration number in the format 2000-AG-1000";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("Registration number is required")]
    Missing,
    #[error("Please enter a valid registration number in the format 2000-AG-1000")]
    InvalidFormat(String),
}

/// True when `value` is exactly four digits, `-AG-` (any case), four digits.
pub fn validate_registration(value: &str) -> bool {
    REGISTRATION_PATTERN.is_match(value)
}

/// Validate and classify the failure.
pub fn check_registration(value: &str) -> Result<(), RegistrationError> {
    if value.is_empty() {
        return Err(RegistrationError::Missing);
    }
    if validate_registration(value) {
        Ok(())
    } else {
        Err(RegistrationError::InvalidFormat(value.to_string()))
    }
}

//! Field validation for admin writes.
//!
//! Upstream syncs bypass these checks; they apply to hand-entered data only.

use crate::errors::{Error, Result};
use regex::Regex;

const STATE_ABBREVIATION: &str = r"^[A-Z]{2}$";
const POSTAL_CODE: &str = r"^\d{5}-?\d{3}$";
const PHONE_NUMBER: &str = r"^\d+$";

pub const PHONE_COUNTRIES: [&str; 2] = ["BR", "US"];
pub const MAX_ABBREVIATION_LEN: usize = 3;
pub const MAX_COLOR_CODE_LEN: usize = 7;

fn is_match(pattern: &str, value: &str) -> Result<bool> {
    let regex = Regex::new(pattern).map_err(|e| Error::Internal {
        operation: format!("compile validation pattern {pattern}: {e}"),
    })?;
    Ok(regex.is_match(value))
}

fn bad_request(message: impl Into<String>) -> Error {
    Error::BadRequest { message: message.into() }
}

/// Trim and uppercase a state abbreviation, which must then be exactly two letters.
pub fn state_abbreviation(value: &str) -> Result<String> {
    let normalized = value.trim().to_uppercase();
    if !is_match(STATE_ABBREVIATION, &normalized)? {
        return Err(bad_request(format!("State abbreviation must be two letters, got '{value}'")));
    }
    Ok(normalized)
}

/// Brazilian postal code (CEP): `12345-678` or `12345678`.
pub fn postal_code(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_match(POSTAL_CODE, trimmed)? {
        return Err(bad_request(format!("Invalid postal code '{value}', expected 12345-678")));
    }
    Ok(trimmed.to_string())
}

pub fn phone_number(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_match(PHONE_NUMBER, trimmed)? {
        return Err(bad_request("Phone number must contain digits only"));
    }
    Ok(trimmed.to_string())
}

pub fn phone_country(value: &str) -> Result<String> {
    let normalized = value.trim().to_uppercase();
    if !PHONE_COUNTRIES.contains(&normalized.as_str()) {
        return Err(bad_request(format!(
            "Phone country must be one of {}, got '{value}'",
            PHONE_COUNTRIES.join(", ")
        )));
    }
    Ok(normalized)
}

/// Short code used by genders, phone types and address types
pub fn abbreviation(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_ABBREVIATION_LEN {
        return Err(bad_request(format!(
            "Abbreviation must have between 1 and {MAX_ABBREVIATION_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub fn color_code(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > MAX_COLOR_CODE_LEN {
        return Err(bad_request(format!("Color code must have at most {MAX_COLOR_CODE_LEN} characters")));
    }
    Ok(trimmed.to_string())
}

pub fn name(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(bad_request("Name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

/// Trimmed search term; blank means no filter.
pub fn search_term(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// Apply a validator to an optional patch field.
pub fn optional<F>(value: Option<&str>, validate: F) -> Result<Option<String>>
where
    F: Fn(&str) -> Result<String>,
{
    value.map(validate).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_abbreviation_normalized() {
        assert_eq!(state_abbreviation(" sp ").unwrap(), "SP");
        assert!(state_abbreviation("S").is_err());
        assert!(state_abbreviation("SPX").is_err());
        assert!(state_abbreviation("S1").is_err());
    }

    #[test]
    fn test_postal_code() {
        assert_eq!(postal_code("01310-100").unwrap(), "01310-100");
        assert!(postal_code("01310100").is_ok());
        assert!(postal_code("0131-0100").is_err());
        assert!(postal_code("01310-10").is_err());
    }

    #[test]
    fn test_phone_fields() {
        assert!(phone_number("11987654321").is_ok());
        assert!(phone_number("(11) 98765-4321").is_err());
        assert!(phone_number("").is_err());
        assert_eq!(phone_country("br").unwrap(), "BR");
        assert!(phone_country("PT").is_err());
    }

    #[test]
    fn test_short_fields() {
        assert!(abbreviation("RES").is_ok());
        assert!(abbreviation("RESI").is_err());
        assert!(abbreviation(" ").is_err());
        assert!(color_code("#FF00AA").is_ok());
        assert!(color_code("#FF00AA0").is_err());
        assert!(name("  ").is_err());
    }

    #[test]
    fn test_search_term_and_optional() {
        assert_eq!(search_term(Some("  paulo ")), Some("paulo".to_string()));
        assert_eq!(search_term(Some("   ")), None);
        assert_eq!(search_term(None), None);

        assert_eq!(optional(Some("rj"), state_abbreviation).unwrap(), Some("RJ".to_string()));
        assert_eq!(optional(None, state_abbreviation).unwrap(), None);
        assert!(optional(Some("rio"), state_abbreviation).is_err());
    }
}

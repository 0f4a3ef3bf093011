use once_cell::sync::Lazy;
use phonenumber::{Mode, country::Id};
use regex::Regex;
use crate::models::errors::PhoneNumberError;

pub const LOCAL_NUMBER_LENGTH: usize = 10;

static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").unwrap());

/// Cleans free-text input from the phone field: strips every non-digit
/// character and truncates to ten digits.
pub fn clean_local_input(raw: &str) -> String {
    let digits = NON_DIGIT.replace_all(raw.trim(), "").to_string();
    digits.chars().take(LOCAL_NUMBER_LENGTH).collect()
}

/// Valid iff exactly ten digits remain after cleaning.
pub fn is_valid_local(cleaned: &str) -> bool {
    cleaned.len() == LOCAL_NUMBER_LENGTH && cleaned.chars().all(|c| c.is_ascii_digit())
}

/// Formats a number to E.164, prefixing the region's country code unless
/// the input already carries one. Formatting an already formatted number
/// returns it unchanged.
pub fn format_e164(number: &str, default_region: &str) -> Result<String, PhoneNumberError> {
    let trimmed = number.trim();

    let parsed = if trimmed.starts_with('+') {
        phonenumber::parse(None, trimmed)
    } else {
        let cleaned = clean_local_input(trimmed);
        if !is_valid_local(&cleaned) {
            return Err(PhoneNumberError::InvalidNumberLength);
        }
        let country = default_region
            .trim()
            .parse::<Id>()
            .map_err(|_| PhoneNumberError::InvalidCountryCode)?;
        phonenumber::parse(Some(country), cleaned)
    }
    .map_err(|err| PhoneNumberError::ParseError(format!("{:?}", err)))?;

    Ok(parsed.format().mode(Mode::E164).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_strips_and_truncates() {
        assert_eq!(clean_local_input(" 98765-43210 "), "9876543210");
        assert_eq!(clean_local_input("(987) 654 3210 999"), "9876543210");
        assert_eq!(clean_local_input("abc987"), "987");
    }

    #[test]
    fn test_validity_predicate() {
        assert!(is_valid_local("9876543210"));
        assert!(!is_valid_local("987654321"));
        assert!(!is_valid_local(""));
    }

    #[test]
    fn test_formats_local_number() {
        let formatted = format_e164("9876543210", "IN").unwrap();
        assert_eq!(formatted, "+919876543210");
    }

    #[test]
    fn test_formatting_is_idempotent() {
        let once = format_e164("9876543210", "IN").unwrap();
        let twice = format_e164(&once, "IN").unwrap();
        assert_eq!(once, twice);
        assert_eq!(twice, "+919876543210");
    }

    #[test]
    fn test_repeated_submission_prepends_once() {
        // Repeated submissions of the same raw input must all land on the
        // same E.164 string, with the country code applied exactly once.
        let first = format_e164("98765 43210", "IN").unwrap();
        let second = format_e164("9876543210", "IN").unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("+91"));
        assert_eq!(first.matches("+").count(), 1);
    }

    #[test]
    fn test_short_number_is_rejected() {
        assert!(matches!(
            format_e164("98765", "IN"),
            Err(PhoneNumberError::InvalidNumberLength)
        ));
    }

    #[test]
    fn test_unknown_region_is_rejected() {
        assert!(matches!(
            format_e164("9876543210", "ZZ"),
            Err(PhoneNumberError::InvalidCountryCode)
        ));
    }
}

// Request field validation helpers
// All checks run before any network or database call.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minimum age for a profile
pub const MIN_AGE_YEARS: i32 = 18;

/// Maximum free-text description length
pub const MAX_DESCRIPTION_CHARS: usize = 500;

// Romanian mobile/landline formats, with optional +40 prefix
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\+4)?0\d{9}$").expect("phone regex is valid"));

/// Custom password validation: min 8 chars with uppercase, lowercase,
/// digit and special character
pub fn validate_password(password: &str) -> Result<(), validator::ValidationError> {
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| !c.is_alphanumeric());

    if password.len() < 8 {
        return Err(validator::ValidationError::new("password_too_short"));
    }

    if !has_uppercase || !has_lowercase || !has_digit || !has_special {
        return Err(validator::ValidationError::new("password_complexity"));
    }

    Ok(())
}

pub fn validate_phone(phone: &str) -> Result<(), validator::ValidationError> {
    let cleaned: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    if PHONE_RE.is_match(&cleaned) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_phone"))
    }
}

/// Age in whole years as of today
pub fn age_in_years(birth_date: NaiveDate) -> i32 {
    let today = Utc::now().date_naive();
    let mut age = today.year_ce().1 as i32 - birth_date.year_ce().1 as i32;

    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }

    age
}

pub fn validate_adult(birth_date: NaiveDate) -> Result<(), validator::ValidationError> {
    if age_in_years(birth_date) >= MIN_AGE_YEARS {
        Ok(())
    } else {
        Err(validator::ValidationError::new("underage"))
    }
}

pub fn validate_description(description: &str) -> Result<(), validator::ValidationError> {
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(validator::ValidationError::new("description_too_long"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Str0ng!pw").is_ok());
        assert!(validate_password("short1!").is_err());
        assert!(validate_password("noupper1!").is_err());
        assert!(validate_password("NOLOWER1!").is_err());
        assert!(validate_password("NoDigits!").is_err());
        assert!(validate_password("NoSpecial1").is_err());
    }

    #[test]
    fn test_phone_formats() {
        assert!(validate_phone("0712345678").is_ok());
        assert!(validate_phone("+40712345678").is_ok());
        assert!(validate_phone("0712 345 678").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("0712abc678").is_err());
    }

    #[test]
    fn test_adult_check() {
        let today = Utc::now().date_naive();

        let adult = today - Duration::days(19 * 365);
        assert!(validate_adult(adult).is_ok());

        let minor = today - Duration::days(17 * 365);
        assert!(validate_adult(minor).is_err());
    }

    #[test]
    fn test_description_length() {
        assert!(validate_description(&"a".repeat(500)).is_ok());
        assert!(validate_description(&"a".repeat(501)).is_err());
    }
}

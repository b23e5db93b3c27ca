use std::borrow::Cow;

use chrono::{Datelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use validator::ValidationError;

use crate::shared::constants::{MIN_TITLE_YEAR, RESERVED_USERNAME};

lazy_static! {
    /// Regex for validating username fields
    /// Letters, digits and `. @ + - _` only
    /// - Valid: "john_doe", "user.name", "a+b@c", "Иван"
    /// - Invalid: "", "user name", "user#1", "user/name"
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();

    /// Regex for validating category and genre slugs
    /// - Valid: "sci-fi", "rock_n_roll", "film2024"
    /// - Invalid: "sci fi", "jazz!", "", "фильм"
    pub static ref SLUG_REGEX: Regex = Regex::new(r"^[-a-zA-Z0-9_]+$").unwrap();
}

/// Rejects the reserved `me` username in any letter casing.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.eq_ignore_ascii_case(RESERVED_USERNAME) {
        return Err(ValidationError::new("reserved_username").with_message(Cow::from(format!(
            "Username '{}' is reserved",
            username
        ))));
    }
    Ok(())
}

/// Year must fall between 1900 and the current calendar year (UTC).
pub fn validate_year(year: i16) -> Result<(), ValidationError> {
    let year = i32::from(year);
    let current_year = Utc::now().year();
    if year < MIN_TITLE_YEAR || year > current_year {
        return Err(ValidationError::new("invalid_year").with_message(Cow::from(format!(
            "Year must be between {} and {}",
            MIN_TITLE_YEAR, current_year
        ))));
    }
    Ok(())
}

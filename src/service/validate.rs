//! service::validate
//!
//! Field-level validation helpers shared by the services.
//!
//! Each helper raises [`ServiceError::Validation`] and performs no mutation;
//! services call them before touching the store.

use chrono::{NaiveDate, Utc};

use super::ServiceError;

/// Credit bounds for a course.
pub const MIN_CREDITS: u8 = 1;
pub const MAX_CREDITS: u8 = 20;

/// Maximum length for person and department names.
pub const MAX_NAME_LEN: usize = 50;

/// Maximum length for a course name.
pub const MAX_COURSE_NAME_LEN: usize = 100;

/// Today's date, as used by every future-date check.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Require a non-blank value no longer than `max_len` characters.
pub fn require_text(
    field: &'static str,
    value: &str,
    max_len: usize,
) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{field} is required")));
    }
    if value.chars().count() > max_len {
        return Err(ServiceError::Validation(format!(
            "{field} exceeds {max_len} characters"
        )));
    }
    Ok(())
}

/// Require a date that is not in the future.
pub fn require_not_future(field: &'static str, date: NaiveDate) -> Result<(), ServiceError> {
    if date > today() {
        return Err(ServiceError::Validation(format!(
            "{field} cannot be in the future"
        )));
    }
    Ok(())
}

/// Require a credit count inside the allowed range.
pub fn require_credits(credits: u8) -> Result<(), ServiceError> {
    if !(MIN_CREDITS..=MAX_CREDITS).contains(&credits) {
        return Err(ServiceError::Validation(format!(
            "credits must be between {MIN_CREDITS} and {MAX_CREDITS}, got {credits}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("first name", "", MAX_NAME_LEN).is_err());
        assert!(require_text("first name", "   ", MAX_NAME_LEN).is_err());
        assert!(require_text("first name", "Ada", MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn overlong_text_is_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        assert!(require_text("department", &long, MAX_NAME_LEN).is_err());
        let exact = "x".repeat(MAX_NAME_LEN);
        assert!(require_text("department", &exact, MAX_NAME_LEN).is_ok());
    }

    #[test]
    fn future_dates_are_rejected() {
        let tomorrow = today() + Duration::days(1);
        assert!(require_not_future("enrollment date", tomorrow).is_err());
        assert!(require_not_future("enrollment date", today()).is_ok());
        assert!(require_not_future("enrollment date", today() - Duration::days(30)).is_ok());
    }

    #[test]
    fn credit_bounds() {
        assert!(require_credits(0).is_err());
        assert!(require_credits(MIN_CREDITS).is_ok());
        assert!(require_credits(MAX_CREDITS).is_ok());
        assert!(require_credits(MAX_CREDITS + 1).is_err());
    }

    #[test]
    fn validation_messages_name_the_field() {
        let err = require_text("course name", "", MAX_COURSE_NAME_LEN).unwrap_err();
        assert!(err.to_string().contains("course name"));
    }
}

//! Field validation shared by every message handler.
//!
//! All checks here are pure and run before the first store read, so a
//! rejected message never touches state.

use chrono::{DateTime, NaiveDate};

use crate::error::ValidationError;

/// Maximum grade on the 0-100 scale.
pub const MAX_GRADE: f64 = 100.0;

/// Maximum GPA on the 4.0 scale.
pub const MAX_GPA: f64 = 4.0;

/// Reject an empty (or whitespace-only) required field.
pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    Ok(())
}

/// Reject a zero count or amount.
pub fn require_positive(field: &'static str, value: u64) -> Result<(), ValidationError> {
    if value == 0 {
        return Err(ValidationError::out_of_range(field, "must be greater than zero"));
    }
    Ok(())
}

/// Parse a grade string and check it lies in `[0, 100]`.
pub fn parse_grade(value: &str) -> Result<f64, ValidationError> {
    let grade: f64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::malformed("grade", value))?;

    if !grade.is_finite() || !(0.0..=MAX_GRADE).contains(&grade) {
        return Err(ValidationError::out_of_range(
            "grade",
            format!("must be between 0 and 100, got {}", value),
        ));
    }
    Ok(grade)
}

/// Parse a GPA string and check it lies in `(0, 4.0]`.
pub fn parse_gpa(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    let gpa: f64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::malformed(field, value))?;
    check_gpa(field, gpa)?;
    Ok(gpa)
}

/// Check a GPA value lies in `(0, 4.0]`.
pub fn check_gpa(field: &'static str, gpa: f64) -> Result<(), ValidationError> {
    if !gpa.is_finite() || gpa <= 0.0 || gpa > MAX_GPA {
        return Err(ValidationError::out_of_range(
            field,
            format!("must be greater than 0 and at most 4.0, got {}", gpa),
        ));
    }
    Ok(())
}

/// Parse an unsigned credit amount that must be greater than zero.
pub fn parse_credits(field: &'static str, value: &str) -> Result<u64, ValidationError> {
    let credits: u64 = value
        .trim()
        .parse()
        .map_err(|_| ValidationError::malformed(field, value))?;
    require_positive(field, credits)?;
    Ok(credits)
}

/// Accept a date in RFC3339 or `YYYY-MM-DD` form.
pub fn check_date(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
    {
        return Ok(());
    }
    Err(ValidationError::malformed(field, value))
}

/// Check a value is one of an allowed set of strings.
pub fn require_one_of(
    field: &'static str,
    value: &str,
    allowed: &[&str],
    expected: &'static str,
) -> Result<(), ValidationError> {
    if allowed.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::InvalidVariant {
        field,
        value: value.to_string(),
        expected,
    })
}

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Upper bound for any duration field, in minutes (one day)
pub const MAX_MINUTES: u32 = 24 * 60;

/// Upper bound for focus sessions per cycle
pub const MAX_REPEATS: u32 = 100;

/// Rejected user input at the registry/settings boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NonPositive { field: &'static str },
    #[error("{field} must be at most {max}")]
    TooLarge { field: &'static str, max: u32 },
    #[error("{field} is not a number: '{value}'")]
    NotANumber { field: &'static str, value: String },
    #[error("task name must not be empty")]
    EmptyName,
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("invalid time '{0}', expected HH:MM")]
    InvalidTime(String),
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),
}

/// Check a duration in minutes is positive and bounded
pub fn check_minutes(field: &'static str, value: u32) -> Result<u32, ValidationError> {
    check_bounded(field, value, MAX_MINUTES)
}

/// Check a repeats count is positive and bounded
pub fn check_repeats(value: u32) -> Result<u32, ValidationError> {
    check_bounded("repeats", value, MAX_REPEATS)
}

fn check_bounded(field: &'static str, value: u32, max: u32) -> Result<u32, ValidationError> {
    if value == 0 {
        return Err(ValidationError::NonPositive { field });
    }
    if value > max {
        return Err(ValidationError::TooLarge { field, max });
    }
    Ok(value)
}

/// Parse a duration typed by the user
pub fn parse_minutes(field: &'static str, raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field,
        value: trimmed.to_string(),
    })?;
    if value <= 0 {
        return Err(ValidationError::NonPositive { field });
    }
    let value = u32::try_from(value).map_err(|_| ValidationError::TooLarge {
        field,
        max: MAX_MINUTES,
    })?;
    check_minutes(field, value)
}

/// Parse a repeats count typed by the user
pub fn parse_repeats(raw: &str) -> Result<u32, ValidationError> {
    let trimmed = raw.trim();
    let value: i64 = trimmed.parse().map_err(|_| ValidationError::NotANumber {
        field: "repeats",
        value: trimmed.to_string(),
    })?;
    if value <= 0 {
        return Err(ValidationError::NonPositive { field: "repeats" });
    }
    let value = u32::try_from(value).map_err(|_| ValidationError::TooLarge {
        field: "repeats",
        max: MAX_REPEATS,
    })?;
    check_repeats(value)
}

pub fn check_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Parse an optional YYYY-MM-DD date; blank means "no date"
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}

/// Parse an optional HH:MM time; blank means "all day"
pub fn parse_optional_time(raw: &str) -> Result<Option<NaiveTime>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| ValidationError::InvalidTime(trimmed.to_string()))
}

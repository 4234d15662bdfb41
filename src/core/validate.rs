//! Input validation shared by the create/update flows.
//!
//! Everything here is pure so that malformed input is rejected before a transaction opens.

use crate::errors::{Error, Result};

/// Trims a name and rejects it if nothing is left.
pub fn name(raw: &str, what: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid(format!("{what} name cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// Rejects negative, NaN and infinite amounts.
pub fn amount(value: f64) -> Result<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::InvalidAmount { amount: value });
    }
    Ok(value)
}

/// Rejects amounts that are not strictly positive (profit margins).
pub fn positive_amount(value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidAmount { amount: value });
    }
    Ok(value)
}

/// Comparison key for case-insensitive names: trimmed and Unicode-lowercased.
#[must_use]
pub fn name_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Rejects non-positive identifiers.
pub fn id(value: i64, what: &str) -> Result<i64> {
    if value <= 0 {
        return Err(Error::invalid(format!("{what} id must be positive, got {value}")));
    }
    Ok(value)
}

/// Rejects quantities that are not strictly positive.
pub fn positive_quantity(value: i32, what: &str) -> Result<i32> {
    if value <= 0 {
        return Err(Error::invalid(format!("{what} quantity must be positive, got {value}")));
    }
    Ok(value)
}

/// Rejects negative counts (process quantity, minutes).
pub fn non_negative(value: i32, what: &str) -> Result<i32> {
    if value < 0 {
        return Err(Error::invalid(format!("{what} cannot be negative, got {value}")));
    }
    Ok(value)
}

/// Parses a caller-supplied identifier such as a path segment.
pub fn parse_id(raw: &str, what: &str) -> Result<i64> {
    let parsed = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| Error::invalid(format!("{what} id must be a number, got '{raw}'")))?;
    id(parsed, what)
}

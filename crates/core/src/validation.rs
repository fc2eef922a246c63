//! Field validation primitives.
//!
//! This module contains the per-field checks the validation schema composes.
//! Each function takes the stable field name so the violation it reports can
//! be rendered inline next to the offending input.

use crate::fields::FieldViolation;
use carebook_types::NonEmptyText;
use chrono::{DateTime, Utc};

/// Validates a required free-text field.
///
/// Rejects a missing value and a value that is empty after trimming.
pub fn require_non_empty(
    field: &'static str,
    value: Option<&str>,
) -> Result<NonEmptyText, FieldViolation> {
    match value {
        None => Err(FieldViolation::new(field, "is required")),
        Some(raw) => NonEmptyText::new(raw)
            .map_err(|_| FieldViolation::new(field, "must not be empty")),
    }
}

/// Validates a required appointment timestamp.
///
/// The value must be an RFC 3339 timestamp and must not lie in the past
/// relative to `now`. `now` is injected by the caller so the check stays
/// deterministic under test.
pub fn require_schedule(
    field: &'static str,
    value: Option<&str>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, FieldViolation> {
    let raw = match value {
        None => return Err(FieldViolation::new(field, "is required")),
        Some(raw) if raw.trim().is_empty() => {
            return Err(FieldViolation::new(field, "is required"))
        }
        Some(raw) => raw,
    };

    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| FieldViolation::new(field, format!("is not a valid RFC 3339 timestamp: {e}")))?
        .with_timezone(&Utc);

    if parsed < now {
        return Err(FieldViolation::new(
            field,
            "must be in the present or future",
        ));
    }

    Ok(parsed)
}

/// Normalises an optional free-text field.
///
/// A value that is empty after trimming is treated as absent rather than
/// rejected, matching how a form submits untouched optional inputs.
pub fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

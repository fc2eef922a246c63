//! Form field values crossing the presentation boundary.
//!
//! The form adapter supplies a mapping of stable field names to raw string
//! values; the core hands back either typed, validated values or a list of
//! per-field violations. Field names are part of the external contract and
//! must not change.

use carebook_types::NonEmptyText;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stable field names of the input boundary.
pub mod field_names {
    pub const PRIMARY_PHYSICIAN: &str = "primaryPhysician";
    pub const SCHEDULE: &str = "schedule";
    pub const REASON: &str = "reason";
    pub const NOTE: &str = "note";
    pub const CANCELLATION_REASON: &str = "cancellationReason";
}

/// Raw field values as supplied by the form adapter.
///
/// All fields are optional strings; which of them must be present and
/// well-formed is decided by the active validation schema, not by this type.
/// Timestamps arrive as RFC 3339 strings and are only parsed during
/// validation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFieldValues {
    #[serde(rename = "primaryPhysician", default)]
    pub primary_physician: Option<String>,
    #[serde(default)]
    pub schedule: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(rename = "cancellationReason", default)]
    pub cancellation_reason: Option<String>,
}

impl RawFieldValues {
    /// Returns the raw value of the named field, if supplied.
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            field_names::PRIMARY_PHYSICIAN => self.primary_physician.as_deref(),
            field_names::SCHEDULE => self.schedule.as_deref(),
            field_names::REASON => self.reason.as_deref(),
            field_names::NOTE => self.note.as_deref(),
            field_names::CANCELLATION_REASON => self.cancellation_reason.as_deref(),
            _ => None,
        }
    }
}

/// Field values after validation against the active schema.
///
/// Only fields the schema actually validated are populated; fields the
/// schema ignored are `None` regardless of what the form supplied.
#[derive(Clone, Debug, Default)]
pub struct ValidatedFields {
    pub primary_physician: Option<NonEmptyText>,
    pub schedule: Option<DateTime<Utc>>,
    pub reason: Option<NonEmptyText>,
    pub note: Option<String>,
    pub cancellation_reason: Option<NonEmptyText>,
}

/// A single field-level validation violation.
///
/// Reported per field so the form adapter can render the message inline next
/// to the offending input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    /// Stable field name from [`field_names`].
    pub field: &'static str,
    /// Human-readable message for inline display.
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

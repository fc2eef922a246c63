//! Appointment operation kinds.
//!
//! An [`OperationKind`] is the patient's intent for a single form submission:
//! request a new appointment, confirm an existing one, or cancel one. It is a
//! transient instruction, never persisted, and it determines both the active
//! validation schema and the status the appointment ends up in.
//!
//! The kind is a closed enum on purpose: the resolver in
//! [`OperationKind::resulting_status`] is exhaustive, so there is no silent
//! fallback path for an unrecognised kind. Boundary code that receives the
//! kind as a string must go through [`OperationKind::from_str`], which fails
//! loudly instead of defaulting.

use crate::status::AppointmentStatus;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Error returned when a boundary string does not name a known operation.
///
/// This is a caller contract violation, not a recoverable user input error.
#[derive(Debug, thiserror::Error)]
#[error("unknown operation kind: '{0}' (expected one of: create, schedule, cancel)")]
pub struct UnknownOperation(pub String);

/// The patient's intent for an appointment action.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    /// Request a new appointment. The appointment starts out `pending`.
    Create,
    /// Confirm an existing appointment, fixing physician and time.
    Schedule,
    /// Cancel an existing appointment, recording why.
    Cancel,
}

impl OperationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Schedule => "schedule",
            Self::Cancel => "cancel",
        }
    }

    /// The status an appointment ends up in after this operation succeeds.
    ///
    /// Policy: newly created appointments always start `pending` regardless
    /// of later intent; only an explicit `schedule` or `cancel` operation
    /// advances status. The match is exhaustive over the closed enum, so
    /// totality is checked by the compiler.
    pub const fn resulting_status(self) -> AppointmentStatus {
        match self {
            Self::Create => AppointmentStatus::Pending,
            Self::Schedule => AppointmentStatus::Scheduled,
            Self::Cancel => AppointmentStatus::Cancelled,
        }
    }

    /// Whether this operation targets an existing appointment record.
    pub const fn targets_existing(self) -> bool {
        matches!(self, Self::Schedule | Self::Cancel)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "schedule" => Ok(Self::Schedule),
            "cancel" => Ok(Self::Cancel),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resulting_status_is_total_and_deterministic() {
        assert_eq!(
            OperationKind::Create.resulting_status(),
            AppointmentStatus::Pending
        );
        assert_eq!(
            OperationKind::Schedule.resulting_status(),
            AppointmentStatus::Scheduled
        );
        assert_eq!(
            OperationKind::Cancel.resulting_status(),
            AppointmentStatus::Cancelled
        );
    }

    #[test]
    fn parse_round_trips_known_kinds() {
        for kind in [
            OperationKind::Create,
            OperationKind::Schedule,
            OperationKind::Cancel,
        ] {
            let parsed: OperationKind = kind.as_str().parse().expect("known kind should parse");
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn parse_fails_loudly_on_unknown_kind() {
        let err = "reschedule"
            .parse::<OperationKind>()
            .expect_err("unknown kind must not be defaulted");
        assert_eq!(
            err.to_string(),
            "unknown operation kind: 'reschedule' (expected one of: create, schedule, cancel)"
        );
    }

    #[test]
    fn only_schedule_and_cancel_target_existing_records() {
        assert!(!OperationKind::Create.targets_existing());
        assert!(OperationKind::Schedule.targets_existing());
        assert!(OperationKind::Cancel.targets_existing());
    }
}

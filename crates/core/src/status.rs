//! Appointment lifecycle status.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// The appointment's lifecycle state.
///
/// State machine per appointment:
///
/// ```text
/// pending --(schedule)--> scheduled
/// pending --(cancel)----> cancelled
/// scheduled --(schedule)--> scheduled   (re-confirmation with a new time)
/// scheduled --(cancel)--> cancelled
/// ```
///
/// `cancelled` is terminal: no transition is defined out of it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Scheduled,
    Cancelled,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transitions are defined out of this status.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Whether an appointment in this status may move to `next`.
    ///
    /// Re-confirming a `scheduled` appointment (`scheduled -> scheduled`) is
    /// permitted; everything out of `cancelled` is rejected.
    pub fn permits(self, next: AppointmentStatus) -> bool {
        match self {
            Self::Pending => matches!(next, Self::Scheduled | Self::Cancelled),
            Self::Scheduled => matches!(next, Self::Scheduled | Self::Cancelled),
            Self::Cancelled => false,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = crate::BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(crate::BookingError::InvalidInput(format!(
                "unknown appointment status: '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_is_the_only_terminal_status() {
        assert!(!AppointmentStatus::Pending.is_terminal());
        assert!(!AppointmentStatus::Scheduled.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn pending_permits_scheduling_and_cancelling() {
        assert!(AppointmentStatus::Pending.permits(AppointmentStatus::Scheduled));
        assert!(AppointmentStatus::Pending.permits(AppointmentStatus::Cancelled));
        assert!(!AppointmentStatus::Pending.permits(AppointmentStatus::Pending));
    }

    #[test]
    fn scheduled_permits_reconfirmation_and_cancelling() {
        assert!(AppointmentStatus::Scheduled.permits(AppointmentStatus::Scheduled));
        assert!(AppointmentStatus::Scheduled.permits(AppointmentStatus::Cancelled));
    }

    #[test]
    fn nothing_leaves_cancelled() {
        assert!(!AppointmentStatus::Cancelled.permits(AppointmentStatus::Pending));
        assert!(!AppointmentStatus::Cancelled.permits(AppointmentStatus::Scheduled));
        assert!(!AppointmentStatus::Cancelled.permits(AppointmentStatus::Cancelled));
    }
}

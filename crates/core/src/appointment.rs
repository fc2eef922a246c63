//! The appointment record and its invariants.

use crate::status::AppointmentStatus;
use crate::{BookingError, BookingResult};
use carebook_uuid::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A materialised appointment record.
///
/// Invariants:
/// - `cancellation_reason` is set if and only if `status` is `cancelled`;
/// - `reason` was captured at creation and is carried unchanged through
///   later confirmations and cancellations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    /// Opaque record identity.
    pub id: RecordId,
    /// The portal user who submitted the booking.
    pub user_id: String,
    /// Reference to the registered patient the appointment is for.
    pub patient: String,
    /// The physician the patient asked to see.
    pub primary_physician: String,
    /// When the appointment is expected to take place.
    pub schedule: DateTime<Utc>,
    /// Why the appointment was requested. Captured at creation.
    pub reason: Option<String>,
    /// Free-text note supplied alongside the request.
    pub note: Option<String>,
    /// Lifecycle state.
    pub status: AppointmentStatus,
    /// Why the appointment was cancelled. Present only when cancelled.
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Checks the record's internal invariants.
    ///
    /// Run before every persist so a buggy caller cannot write a record that
    /// claims to be cancelled without a reason, or carries a stale
    /// cancellation reason after a status change.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::CancellationInvariantViolated` if
    /// `cancellation_reason` and `status` disagree.
    pub fn check_invariants(&self) -> BookingResult<()> {
        let cancelled = self.status == AppointmentStatus::Cancelled;
        if cancelled != self.cancellation_reason.is_some() {
            return Err(BookingError::CancellationInvariantViolated);
        }
        Ok(())
    }
}

/// Tally of appointments per lifecycle status, for the portal dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusTally {
    pub scheduled: usize,
    pub pending: usize,
    pub cancelled: usize,
}

impl StatusTally {
    /// Counts `appointments` per status.
    pub fn of(appointments: &[Appointment]) -> Self {
        let mut tally = Self::default();
        for appointment in appointments {
            match appointment.status {
                AppointmentStatus::Scheduled => tally.scheduled += 1,
                AppointmentStatus::Pending => tally.pending += 1,
                AppointmentStatus::Cancelled => tally.cancelled += 1,
            }
        }
        tally
    }
}

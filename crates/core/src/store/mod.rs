//! The appointment store collaborator seam.
//!
//! The workflow controller only requires that a store can create and update
//! appointments and return either a materialised record or a failure. Wire
//! format and durability are the store's own concern. Two implementations
//! live in this crate: the git-versioned filesystem store
//! ([`crate::repositories::appointments::FsAppointmentStore`]) and a
//! mutex-guarded in-memory store for tests.

pub mod memory;

use crate::appointment::Appointment;
use crate::operation::OperationKind;
use crate::status::AppointmentStatus;
use crate::BookingError;
use carebook_types::NonEmptyText;
use carebook_uuid::RecordId;
use chrono::{DateTime, Utc};

/// Command to durably create a new appointment.
#[derive(Clone, Debug)]
pub struct CreateAppointmentCommand {
    pub user_id: String,
    pub patient: String,
    pub primary_physician: NonEmptyText,
    pub schedule: DateTime<Utc>,
    pub reason: NonEmptyText,
    pub note: Option<String>,
    pub status: AppointmentStatus,
}

/// Command to durably update an existing appointment.
///
/// `primary_physician` and `schedule` are optional: a cancellation does not
/// revisit them, and the store keeps the stored values in that case.
#[derive(Clone, Debug)]
pub struct UpdateAppointmentCommand {
    pub appointment_id: RecordId,
    pub user_id: String,
    pub primary_physician: Option<NonEmptyText>,
    pub schedule: Option<DateTime<Utc>>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<NonEmptyText>,
    pub kind: OperationKind,
}

/// Failures a store operation can report.
///
/// Store failures are surfaced to the caller and never retried
/// automatically: appointment writes carry no idempotency key, so a blind
/// retry risks duplicate creation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no appointment found with id '{id}'")]
    NotFound { id: String },
    #[error("store rejected the command: {0}")]
    Rejected(String),
    #[error("store backend failure: {0}")]
    Backend(#[from] BookingError),
}

/// The external persistence collaborator.
///
/// The store call is an explicit suspend point: implementations may perform
/// I/O. Exactly one of `create_appointment`/`update_appointment` is invoked
/// per workflow submission; `fetch_appointment` backs the transition guard
/// and read endpoints.
#[async_trait::async_trait]
pub trait AppointmentStore: Send + Sync {
    /// Durably creates a new appointment and returns the materialised record.
    async fn create_appointment(
        &self,
        command: CreateAppointmentCommand,
    ) -> Result<Appointment, StoreError>;

    /// Durably updates an existing appointment and returns the new record.
    async fn update_appointment(
        &self,
        command: UpdateAppointmentCommand,
    ) -> Result<Appointment, StoreError>;

    /// Fetches a single appointment by id.
    async fn fetch_appointment(&self, id: &RecordId) -> Result<Appointment, StoreError>;

    /// Lists all appointments known to the store.
    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError>;
}

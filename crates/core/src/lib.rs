//! # carebook Core
//!
//! Core business logic for the carebook appointment portal.
//!
//! This crate contains the appointment lifecycle workflow and the durable
//! record stores behind it:
//! - Validation rule selection per operation kind (`create`, `schedule`,
//!   `cancel`) and per-field input validation
//! - Status resolution and the appointment state machine
//! - The workflow controller orchestrating validation, command construction
//!   and the store round-trip
//! - Git-versioned sharded filesystem storage for appointments and patient
//!   registrations
//!
//! **No API concerns**: HTTP servers, DTOs and routing belong in `api-rest`
//! and `api-shared`.

pub mod appointment;
pub mod config;
pub mod constants;
pub mod error;
pub mod fields;
pub mod operation;
pub mod repositories;
pub mod schema;
pub mod status;
pub mod store;
pub mod validation;
mod versioned_files;
pub mod workflow;

pub use appointment::{Appointment, StatusTally};
pub use config::CoreConfig;
pub use error::{BookingError, BookingResult};
pub use fields::{field_names, FieldViolation, RawFieldValues, ValidatedFields};
pub use operation::{OperationKind, UnknownOperation};
pub use schema::{FieldConstraint, FieldRequirement, FieldSpec, ValidationSchema};
pub use status::AppointmentStatus;
pub use store::{
    memory::MemoryAppointmentStore, AppointmentStore, CreateAppointmentCommand, StoreError,
    UpdateAppointmentCommand,
};
pub use workflow::{
    AppointmentWorkflow, SubmitContext, SubmitPhase, WorkflowError, WorkflowOutcome,
};

// Re-export the shared newtypes so downstream crates rarely need to depend
// on the leaf crates directly.
pub use carebook_types::{NonEmptyText, TextError};
pub use carebook_uuid::{IdError, RecordId};

//! Constants used throughout the carebook core crate.
//!
//! This module contains all path and filename constants to ensure
//! consistency across the codebase and make maintenance easier.

/// Directory name for appointment records storage.
pub const APPOINTMENTS_DIR_NAME: &str = "appointments";

/// Directory name for patient registration records storage.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Default directory for booking data storage when no explicit directory is configured.
pub const DEFAULT_BOOKING_DATA_DIR: &str = "booking_data";

/// Filename for appointment YAML files.
pub const APPOINTMENT_FILE_NAME: &str = "appointment.yaml";

/// Filename for patient YAML files.
pub const PATIENT_FILE_NAME: &str = "patient.yaml";

/// Default `.gitignore` written into every record repository.
pub const DEFAULT_GITIGNORE: &str = "*.tmp\n*.swp\n.DS_Store\n";

/// Default clinic label recorded in commit trailers when none is configured.
pub const DEFAULT_CLINIC_LABEL: &str = "carebook.dev";

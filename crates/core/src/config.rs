//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process
//! startup and then passed into core services. The intent is to avoid reading
//! process-wide environment variables during request handling, which can lead
//! to inconsistent behaviour in multi-threaded runtimes and test harnesses.

use crate::constants::{APPOINTMENTS_DIR_NAME, PATIENTS_DIR_NAME};
use crate::{BookingError, BookingResult};
use carebook_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
///
/// Carries the booking data directory (under which appointment and patient
/// records are sharded) and the clinic label recorded in the audit trail of
/// every record commit.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    booking_data_dir: PathBuf,
    clinic_label: NonEmptyText,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` if `booking_data_dir` is empty.
    pub fn new(booking_data_dir: PathBuf, clinic_label: NonEmptyText) -> BookingResult<Self> {
        if booking_data_dir.as_os_str().is_empty() {
            return Err(BookingError::InvalidInput(
                "booking_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            booking_data_dir,
            clinic_label,
        })
    }

    pub fn booking_data_dir(&self) -> &Path {
        &self.booking_data_dir
    }

    pub fn appointments_dir(&self) -> PathBuf {
        self.booking_data_dir.join(APPOINTMENTS_DIR_NAME)
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.booking_data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn clinic_label(&self) -> &NonEmptyText {
        &self.clinic_label
    }
}

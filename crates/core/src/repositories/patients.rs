//! Patient registration records.
//!
//! Patients register once with their contact details before they can book
//! appointments. Registrations are stored the same way appointments are:
//! YAML files in git-versioned sharded directories under
//! `<booking_data_dir>/patients/`.

use crate::config::CoreConfig;
use crate::constants::{DEFAULT_GITIGNORE, PATIENT_FILE_NAME};
use crate::error::{BookingError, BookingResult};
use crate::repositories::helpers::{create_unique_record_dir, for_each_record_dir};
use crate::versioned_files::{
    CommitAction, FileToWrite, RecordCommitMessage, RecordDomain, VersionedRecordService,
};
use carebook_types::NonEmptyText;
use carebook_uuid::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// A registered portal patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Service for registering and looking up patients.
#[derive(Clone)]
pub struct PatientDirectory {
    cfg: Arc<CoreConfig>,
}

impl PatientDirectory {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    /// Registers a new patient and returns the materialised record.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::InvalidInput` if the email does not look like
    /// an address or the phone is empty, and the underlying storage error if
    /// the record cannot be written.
    pub fn register(
        &self,
        name: NonEmptyText,
        email: &str,
        phone: &str,
    ) -> BookingResult<Patient> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(BookingError::InvalidInput(
                "email must contain an '@'".into(),
            ));
        }
        let phone = phone.trim();
        if phone.is_empty() {
            return Err(BookingError::InvalidInput("phone cannot be empty".into()));
        }

        let patients_dir = self.cfg.patients_dir();
        std::fs::create_dir_all(&patients_dir).map_err(BookingError::StorageDirCreation)?;

        let (id, record_dir) = create_unique_record_dir(&patients_dir)?;
        let patient = Patient {
            id,
            name: name.into_inner(),
            email: email.to_owned(),
            phone: phone.to_owned(),
            created_at: Utc::now(),
        };

        let yaml = serde_yaml::to_string(&patient).map_err(BookingError::YamlSerialization)?;
        let message = RecordCommitMessage::new(
            RecordDomain::Patient,
            CommitAction::Create,
            "Patient registered",
            self.cfg.clinic_label(),
        )?;

        VersionedRecordService::init_and_commit(
            &record_dir,
            &message,
            &[
                FileToWrite {
                    relative_path: Path::new(".gitignore"),
                    content: DEFAULT_GITIGNORE,
                },
                FileToWrite {
                    relative_path: Path::new(PATIENT_FILE_NAME),
                    content: &yaml,
                },
            ],
        )?;

        tracing::info!(patient_id = %patient.id, "patient registered");
        Ok(patient)
    }

    /// Fetches a registered patient by id.
    ///
    /// # Errors
    ///
    /// Returns `BookingError::RecordNotFound` if no such patient exists.
    pub fn fetch(&self, id: &RecordId) -> BookingResult<Patient> {
        let path = id
            .sharded_dir(&self.cfg.patients_dir())
            .join(PATIENT_FILE_NAME);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BookingError::RecordNotFound(id.to_string()))
            }
            Err(e) => return Err(BookingError::FileRead(e)),
        };

        serde_yaml::from_str(&raw).map_err(BookingError::YamlDeserialization)
    }

    /// Lists all registered patients.
    ///
    /// Individual records that cannot be parsed are logged as warnings and
    /// skipped.
    pub fn list(&self) -> Vec<Patient> {
        let mut patients = Vec::new();

        for_each_record_dir(&self.cfg.patients_dir(), |record_dir| {
            let path = record_dir.join(PATIENT_FILE_NAME);
            if !path.is_file() {
                return;
            }

            match std::fs::read_to_string(&path) {
                Ok(raw) => match serde_yaml::from_str::<Patient>(&raw) {
                    Ok(patient) => patients.push(patient),
                    Err(e) => {
                        tracing::warn!("failed to parse patient.yaml: {} - {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("failed to read patient.yaml: {} - {}", path.display(), e);
                }
            }
        });

        patients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        patients
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_directory(dir: &Path) -> PatientDirectory {
        PatientDirectory::new(Arc::new(
            CoreConfig::new(
                dir.to_path_buf(),
                NonEmptyText::new("Westway Surgery").unwrap(),
            )
            .expect("CoreConfig::new should succeed"),
        ))
    }

    #[test]
    fn register_then_fetch_round_trips() {
        let temp_dir = TempDir::new().expect("temp dir");
        let directory = test_directory(temp_dir.path());

        let patient = directory
            .register(
                NonEmptyText::new("Ada Osei").unwrap(),
                "ada@example.com",
                "+44 20 7946 0000",
            )
            .expect("register should succeed");

        let fetched = directory.fetch(&patient.id).expect("fetch should succeed");
        assert_eq!(fetched, patient);

        let record_dir = patient.id.sharded_dir(&temp_dir.path().join("patients"));
        assert!(record_dir.join(".git").is_dir());
        assert!(record_dir.join(PATIENT_FILE_NAME).is_file());
    }

    #[test]
    fn register_rejects_bad_contact_details() {
        let temp_dir = TempDir::new().expect("temp dir");
        let directory = test_directory(temp_dir.path());

        let err = directory
            .register(NonEmptyText::new("Ada Osei").unwrap(), "not-an-email", "123")
            .expect_err("email without '@' should be rejected");
        assert!(matches!(err, BookingError::InvalidInput(_)));

        let err = directory
            .register(NonEmptyText::new("Ada Osei").unwrap(), "ada@example.com", " ")
            .expect_err("blank phone should be rejected");
        assert!(matches!(err, BookingError::InvalidInput(_)));
    }

    #[test]
    fn fetch_unknown_id_reports_not_found() {
        let temp_dir = TempDir::new().expect("temp dir");
        let directory = test_directory(temp_dir.path());

        let err = directory
            .fetch(&RecordId::new())
            .expect_err("unknown id should not resolve");
        assert!(matches!(err, BookingError::RecordNotFound(_)));
    }

    #[test]
    fn list_returns_registered_patients() {
        let temp_dir = TempDir::new().expect("temp dir");
        let directory = test_directory(temp_dir.path());

        directory
            .register(
                NonEmptyText::new("Ada Osei").unwrap(),
                "ada@example.com",
                "+44 20 7946 0000",
            )
            .expect("register should succeed");
        directory
            .register(
                NonEmptyText::new("Ben Carter").unwrap(),
                "ben@example.com",
                "+44 20 7946 0001",
            )
            .expect("register should succeed");

        let patients = directory.list();
        assert_eq!(patients.len(), 2);
        assert!(patients.iter().any(|p| p.name == "Ada Osei"));
        assert!(patients.iter().any(|p| p.name == "Ben Carter"));
    }
}

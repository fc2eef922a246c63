//! Filesystem-backed appointment store.
//!
//! Appointments are stored as YAML files in a sharded directory structure
//! under `<booking_data_dir>/appointments/`:
//!
//! ```text
//! appointments/
//!   <s1>/
//!     <s2>/
//!       <id>/
//!         appointment.yaml
//!         .git/              # per-record history
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the record id.
//! Every write is committed to the record's Git repository through
//! [`VersionedRecordService`], so the full lifecycle of an appointment
//! (requested, confirmed, cancelled) stays auditable.

use crate::appointment::Appointment;
use crate::config::CoreConfig;
use crate::constants::{APPOINTMENT_FILE_NAME, DEFAULT_GITIGNORE};
use crate::error::{BookingError, BookingResult};
use crate::operation::OperationKind;
use crate::repositories::helpers::{create_unique_record_dir, for_each_record_dir};
use crate::store::{
    AppointmentStore, CreateAppointmentCommand, StoreError, UpdateAppointmentCommand,
};
use crate::versioned_files::{
    CommitAction, FileToWrite, RecordCommitMessage, RecordDomain, VersionedRecordService,
};
use carebook_uuid::RecordId;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Durable appointment store over the booking data directory.
#[derive(Clone)]
pub struct FsAppointmentStore {
    cfg: Arc<CoreConfig>,
}

impl FsAppointmentStore {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn record_dir(&self, id: &RecordId) -> PathBuf {
        id.sharded_dir(&self.cfg.appointments_dir())
    }

    fn load(&self, id: &RecordId) -> Result<Appointment, StoreError> {
        let path = self.record_dir(id).join(APPOINTMENT_FILE_NAME);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound { id: id.to_string() })
            }
            Err(e) => return Err(StoreError::Backend(BookingError::FileRead(e))),
        };

        let appointment =
            serde_yaml::from_str(&raw).map_err(BookingError::YamlDeserialization)?;
        Ok(appointment)
    }

    fn render(appointment: &Appointment) -> BookingResult<String> {
        serde_yaml::to_string(appointment).map_err(BookingError::YamlSerialization)
    }

    fn update_message(
        &self,
        kind: OperationKind,
        user_id: &str,
    ) -> BookingResult<RecordCommitMessage> {
        let subject = match kind {
            OperationKind::Schedule => "Appointment scheduled",
            OperationKind::Cancel => "Appointment cancelled",
            OperationKind::Create => "Appointment updated",
        };
        RecordCommitMessage::new(
            RecordDomain::Appointment,
            CommitAction::Update,
            subject,
            self.cfg.clinic_label(),
        )?
        .with_trailer("Submitted-By", user_id)
    }
}

#[async_trait::async_trait]
impl AppointmentStore for FsAppointmentStore {
    async fn create_appointment(
        &self,
        command: CreateAppointmentCommand,
    ) -> Result<Appointment, StoreError> {
        let appointments_dir = self.cfg.appointments_dir();
        std::fs::create_dir_all(&appointments_dir)
            .map_err(BookingError::StorageDirCreation)?;

        let (id, record_dir) = create_unique_record_dir(&appointments_dir)?;
        let now = Utc::now();

        let appointment = Appointment {
            id,
            user_id: command.user_id,
            patient: command.patient,
            primary_physician: command.primary_physician.into_inner(),
            schedule: command.schedule,
            reason: Some(command.reason.into_inner()),
            note: command.note,
            status: command.status,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };
        appointment.check_invariants()?;

        let yaml = Self::render(&appointment)?;
        let message = RecordCommitMessage::new(
            RecordDomain::Appointment,
            CommitAction::Create,
            "Appointment requested",
            self.cfg.clinic_label(),
        )
        .and_then(|m| m.with_trailer("Submitted-By", &appointment.user_id))?;

        VersionedRecordService::init_and_commit(
            &record_dir,
            &message,
            &[
                FileToWrite {
                    relative_path: Path::new(".gitignore"),
                    content: DEFAULT_GITIGNORE,
                },
                FileToWrite {
                    relative_path: Path::new(APPOINTMENT_FILE_NAME),
                    content: &yaml,
                },
            ],
        )?;

        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        command: UpdateAppointmentCommand,
    ) -> Result<Appointment, StoreError> {
        let mut appointment = self.load(&command.appointment_id)?;

        if let Some(physician) = command.primary_physician {
            appointment.primary_physician = physician.into_inner();
        }
        if let Some(schedule) = command.schedule {
            appointment.schedule = schedule;
        }
        appointment.status = command.status;
        appointment.cancellation_reason = match command.kind {
            OperationKind::Cancel => command.cancellation_reason.map(|r| r.into_inner()),
            _ => None,
        };
        appointment.updated_at = Utc::now();
        appointment.check_invariants()?;

        let yaml = Self::render(&appointment)?;
        let message = self.update_message(command.kind, &command.user_id)?;

        VersionedRecordService::commit_update(
            &self.record_dir(&appointment.id),
            &message,
            &[FileToWrite {
                relative_path: Path::new(APPOINTMENT_FILE_NAME),
                content: &yaml,
            }],
        )?;

        Ok(appointment)
    }

    async fn fetch_appointment(&self, id: &RecordId) -> Result<Appointment, StoreError> {
        self.load(id)
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let mut appointments = Vec::new();

        for_each_record_dir(&self.cfg.appointments_dir(), |record_dir| {
            let path = record_dir.join(APPOINTMENT_FILE_NAME);
            if !path.is_file() {
                return;
            }

            match std::fs::read_to_string(&path) {
                Ok(raw) => match serde_yaml::from_str::<Appointment>(&raw) {
                    Ok(appointment) => appointments.push(appointment),
                    Err(e) => {
                        tracing::warn!(
                            "failed to parse appointment.yaml: {} - {}",
                            path.display(),
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!("failed to read appointment.yaml: {} - {}", path.display(), e);
                }
            }
        });

        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }
}

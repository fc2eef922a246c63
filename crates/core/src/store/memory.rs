//! In-memory appointment store.
//!
//! Backs the workflow tests and local experimentation. Records live in a
//! mutex-guarded map and disappear with the process; the durable
//! implementation is the filesystem store.

use super::{AppointmentStore, CreateAppointmentCommand, StoreError, UpdateAppointmentCommand};
use crate::appointment::Appointment;
use crate::operation::OperationKind;
use carebook_uuid::RecordId;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// Mutex-guarded map of appointment records.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    records: Mutex<HashMap<String, Appointment>>,
}

impl MemoryAppointmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Appointment>> {
        // A poisoned lock means a panicked test thread; propagating the
        // records as-is keeps the remaining assertions meaningful.
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait::async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn create_appointment(
        &self,
        command: CreateAppointmentCommand,
    ) -> Result<Appointment, StoreError> {
        let now = Utc::now();
        let appointment = Appointment {
            id: RecordId::new(),
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

        self.lock()
            .insert(appointment.id.to_string(), appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment(
        &self,
        command: UpdateAppointmentCommand,
    ) -> Result<Appointment, StoreError> {
        let mut records = self.lock();
        let appointment =
            records
                .get_mut(&command.appointment_id.to_string())
                .ok_or(StoreError::NotFound {
                    id: command.appointment_id.to_string(),
                })?;

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

        Ok(appointment.clone())
    }

    async fn fetch_appointment(&self, id: &RecordId) -> Result<Appointment, StoreError> {
        self.lock()
            .get(&id.to_string())
            .cloned()
            .ok_or(StoreError::NotFound { id: id.to_string() })
    }

    async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
        let mut appointments: Vec<Appointment> = self.lock().values().cloned().collect();
        appointments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(appointments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::AppointmentStatus;
    use carebook_types::NonEmptyText;
    use chrono::{Duration, Utc};

    fn create_command() -> CreateAppointmentCommand {
        CreateAppointmentCommand {
            user_id: "u1".into(),
            patient: "p1".into(),
            primary_physician: NonEmptyText::new("Dr. Leila Cameron").unwrap(),
            schedule: Utc::now() + Duration::days(7),
            reason: NonEmptyText::new("Annual check-up").unwrap(),
            note: None,
            status: AppointmentStatus::Pending,
        }
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips() {
        let store = MemoryAppointmentStore::new();
        let created = store
            .create_appointment(create_command())
            .await
            .expect("create should succeed");

        let fetched = store
            .fetch_appointment(&created.id)
            .await
            .expect("fetch should succeed");
        assert_eq!(created, fetched);
        assert_eq!(fetched.status, AppointmentStatus::Pending);
        assert_eq!(fetched.reason.as_deref(), Some("Annual check-up"));
    }

    #[tokio::test]
    async fn cancel_update_sets_reason_and_keeps_schedule() {
        let store = MemoryAppointmentStore::new();
        let created = store
            .create_appointment(create_command())
            .await
            .expect("create should succeed");

        let updated = store
            .update_appointment(UpdateAppointmentCommand {
                appointment_id: created.id.clone(),
                user_id: "u1".into(),
                primary_physician: None,
                schedule: None,
                status: AppointmentStatus::Cancelled,
                cancellation_reason: Some(NonEmptyText::new("Recovered").unwrap()),
                kind: crate::OperationKind::Cancel,
            })
            .await
            .expect("update should succeed");

        assert_eq!(updated.status, AppointmentStatus::Cancelled);
        assert_eq!(updated.cancellation_reason.as_deref(), Some("Recovered"));
        assert_eq!(updated.schedule, created.schedule);
        assert_eq!(updated.primary_physician, created.primary_physician);
    }

    #[tokio::test]
    async fn fetch_unknown_id_reports_not_found() {
        let store = MemoryAppointmentStore::new();
        let err = store
            .fetch_appointment(&RecordId::new())
            .await
            .expect_err("unknown id should not resolve");
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}

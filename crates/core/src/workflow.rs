//! The appointment workflow controller.
//!
//! One controller instance services one booking form. A submission runs
//! validation, resolves the target status, builds the store command for the
//! requested operation and maps the store result onto a navigation outcome.
//! Nothing is thrown past this boundary: every failure mode is a
//! [`WorkflowError`] variant the form adapter can present.
//!
//! ## Single submission in flight
//!
//! The controller owns exactly one piece of shared mutable state: the
//! request phase (`Idle -> Submitting -> {Succeeded, Failed}`). The phase is
//! held at `Submitting` for the whole store round-trip, so a second trigger
//! from a double-clicked submit button is rejected instead of producing a
//! duplicate write. Store writes carry no idempotency key, which is also why
//! a failed submission is surfaced rather than retried.
//!
//! ## Abandonment
//!
//! Dropping the `submit` future (the caller navigated away) discards the
//! result. The write already handed to the store remains the store's
//! responsibility to complete or fail; the controller takes no compensating
//! action and applies no timeout of its own.

use crate::fields::{FieldViolation, RawFieldValues};
use crate::operation::OperationKind;
use crate::schema::ValidationSchema;
use crate::status::AppointmentStatus;
use crate::store::{
    AppointmentStore, CreateAppointmentCommand, StoreError, UpdateAppointmentCommand,
};
use carebook_uuid::RecordId;
use chrono::Utc;
use std::sync::{Arc, Mutex};

/// Phase of the request state machine guarding duplicate submission.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitPhase {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Caller-supplied context for one submission.
///
/// `patient_id` is required for `create`; `appointment_id` is required for
/// `schedule` and `cancel`.
#[derive(Clone, Debug)]
pub struct SubmitContext {
    pub user_id: String,
    pub patient_id: Option<String>,
    pub appointment_id: Option<RecordId>,
}

/// The outcome a successful submission hands back to the form adapter.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WorkflowOutcome {
    /// A new appointment was created; the caller is expected to route to the
    /// confirmation view for it.
    Confirmation {
        user_id: String,
        appointment_id: String,
    },
    /// An existing appointment was updated; the caller closes the dialog and
    /// resets the form.
    CloseAndReset,
}

impl WorkflowOutcome {
    /// The navigation target for a confirmation outcome.
    pub fn path(&self) -> Option<String> {
        match self {
            Self::Confirmation {
                user_id,
                appointment_id,
            } => Some(format!(
                "/patients/{user_id}/new-appointment/success?appointmentId={appointment_id}"
            )),
            Self::CloseAndReset => None,
        }
    }
}

/// Failure modes of a submission.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// One or more fields violate the active schema. Reported per field; the
    /// store was not contacted. Recoverable by re-editing input.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldViolation>),
    /// A submission for this form is still in flight.
    #[error("a submission is already in flight for this form")]
    SubmissionInFlight,
    /// `create` was requested without a patient reference.
    #[error("create requires a registered patient reference")]
    MissingPatient,
    /// `schedule`/`cancel` was requested without an appointment identity.
    #[error("{0} requires an existing appointment id")]
    MissingAppointment(OperationKind),
    /// The appointment's current status does not admit the operation.
    #[error("appointment is {from} and does not admit '{attempted}'")]
    InvalidTransition {
        from: AppointmentStatus,
        attempted: OperationKind,
    },
    /// The store rejected or failed the command. Not retried.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

/// Orchestrates one booking form's submissions against the store.
pub struct AppointmentWorkflow {
    store: Arc<dyn AppointmentStore>,
    phase: Mutex<SubmitPhase>,
}

impl AppointmentWorkflow {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            store,
            phase: Mutex::new(SubmitPhase::Idle),
        }
    }

    /// Current phase of the request state machine.
    pub fn phase(&self) -> SubmitPhase {
        *self.lock_phase()
    }

    /// Whether a submission is currently in flight. The form adapter uses
    /// this to disable the submit trigger.
    pub fn is_submitting(&self) -> bool {
        self.phase() == SubmitPhase::Submitting
    }

    /// Submits one operation.
    ///
    /// # Errors
    ///
    /// See [`WorkflowError`]. After any failure the phase moves to `Failed`
    /// and a new trigger is accepted, so the user can retry explicitly.
    pub async fn submit(
        &self,
        kind: OperationKind,
        fields: &RawFieldValues,
        context: SubmitContext,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let mut guard = self.begin()?;
        let result = self.run(kind, fields, context).await;
        guard.finish(result.is_ok());
        result
    }

    async fn run(
        &self,
        kind: OperationKind,
        fields: &RawFieldValues,
        context: SubmitContext,
    ) -> Result<WorkflowOutcome, WorkflowError> {
        let validated = ValidationSchema::for_kind(kind)
            .validate(fields, Utc::now())
            .map_err(WorkflowError::Validation)?;

        let status = kind.resulting_status();

        match kind {
            OperationKind::Create => {
                let patient = context.patient_id.ok_or(WorkflowError::MissingPatient)?;

                // The create schema marks these fields Required, so
                // validation has populated them.
                let primary_physician = validated
                    .primary_physician
                    .expect("create schema requires primaryPhysician");
                let schedule = validated.schedule.expect("create schema requires schedule");
                let reason = validated.reason.expect("create schema requires reason");

                let command = CreateAppointmentCommand {
                    user_id: context.user_id.clone(),
                    patient,
                    primary_physician,
                    schedule,
                    reason,
                    note: validated.note,
                    status,
                };

                let appointment = self.store.create_appointment(command).await?;
                tracing::info!(appointment_id = %appointment.id, "appointment created");

                Ok(WorkflowOutcome::Confirmation {
                    user_id: context.user_id,
                    appointment_id: appointment.id.to_string(),
                })
            }
            OperationKind::Schedule | OperationKind::Cancel => {
                let appointment_id = context
                    .appointment_id
                    .ok_or(WorkflowError::MissingAppointment(kind))?;

                let current = self.store.fetch_appointment(&appointment_id).await?;
                if !current.status.permits(status) {
                    return Err(WorkflowError::InvalidTransition {
                        from: current.status,
                        attempted: kind,
                    });
                }

                let command = UpdateAppointmentCommand {
                    appointment_id,
                    user_id: context.user_id,
                    primary_physician: validated.primary_physician,
                    schedule: validated.schedule,
                    status,
                    cancellation_reason: validated.cancellation_reason,
                    kind,
                };

                let appointment = self.store.update_appointment(command).await?;
                tracing::info!(
                    appointment_id = %appointment.id,
                    status = %appointment.status,
                    "appointment updated"
                );

                Ok(WorkflowOutcome::CloseAndReset)
            }
        }
    }

    fn begin(&self) -> Result<PhaseGuard<'_>, WorkflowError> {
        let mut phase = self.lock_phase();
        if *phase == SubmitPhase::Submitting {
            return Err(WorkflowError::SubmissionInFlight);
        }
        *phase = SubmitPhase::Submitting;
        Ok(PhaseGuard {
            phase: &self.phase,
            completed: false,
        })
    }

    fn lock_phase(&self) -> std::sync::MutexGuard<'_, SubmitPhase> {
        self.phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases the in-flight gate when a submission resolves.
///
/// If the submit future is dropped at the store suspend point, the drop
/// handler moves the phase to `Failed` so the form is not wedged in
/// `Submitting` forever.
struct PhaseGuard<'a> {
    phase: &'a Mutex<SubmitPhase>,
    completed: bool,
}

impl PhaseGuard<'_> {
    fn finish(&mut self, success: bool) {
        let mut phase = self
            .phase
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *phase = if success {
            SubmitPhase::Succeeded
        } else {
            SubmitPhase::Failed
        };
        self.completed = true;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        if !self.completed {
            let mut phase = self
                .phase
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *phase = SubmitPhase::Failed;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::Appointment;
    use crate::store::memory::MemoryAppointmentStore;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    const FIXED_ID: &str = "a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1";

    fn future_schedule() -> String {
        (Utc::now() + Duration::days(7)).to_rfc3339()
    }

    fn create_fields() -> RawFieldValues {
        RawFieldValues {
            primary_physician: Some("Dr. Leila Cameron".into()),
            schedule: Some(future_schedule()),
            reason: Some("Annual check-up".into()),
            note: None,
            cancellation_reason: None,
        }
    }

    fn create_context() -> SubmitContext {
        SubmitContext {
            user_id: "u1".into(),
            patient_id: Some("p1".into()),
            appointment_id: None,
        }
    }

    fn materialised(id: &str, status: AppointmentStatus) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: RecordId::parse(id).unwrap(),
            user_id: "u1".into(),
            patient: "p1".into(),
            primary_physician: "Dr. Leila Cameron".into(),
            schedule: now + Duration::days(7),
            reason: Some("Annual check-up".into()),
            note: None,
            status,
            cancellation_reason: match status {
                AppointmentStatus::Cancelled => Some("Recovered".into()),
                _ => None,
            },
            created_at: now,
            updated_at: now,
        }
    }

    /// Store double that returns canned records and counts invocations.
    #[derive(Default)]
    struct ScriptedStore {
        create_calls: AtomicUsize,
        update_calls: AtomicUsize,
        captured_update: Mutex<Option<UpdateAppointmentCommand>>,
        existing_status: Mutex<Option<AppointmentStatus>>,
        /// When set, `create_appointment` parks until notified.
        hold_create: Option<Arc<Notify>>,
    }

    #[async_trait::async_trait]
    impl AppointmentStore for ScriptedStore {
        async fn create_appointment(
            &self,
            command: CreateAppointmentCommand,
        ) -> Result<Appointment, StoreError> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(hold) = &self.hold_create {
                hold.notified().await;
            }
            let mut appointment = materialised(FIXED_ID, command.status);
            appointment.user_id = command.user_id;
            appointment.patient = command.patient;
            Ok(appointment)
        }

        async fn update_appointment(
            &self,
            command: UpdateAppointmentCommand,
        ) -> Result<Appointment, StoreError> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            let status = command.status;
            *self.captured_update.lock().unwrap() = Some(command);
            let mut appointment = materialised(FIXED_ID, status);
            if status == AppointmentStatus::Cancelled {
                appointment.cancellation_reason = Some("captured".into());
            }
            Ok(appointment)
        }

        async fn fetch_appointment(&self, id: &RecordId) -> Result<Appointment, StoreError> {
            let status = self
                .existing_status
                .lock()
                .unwrap()
                .ok_or(StoreError::NotFound { id: id.to_string() })?;
            Ok(materialised(FIXED_ID, status))
        }

        async fn list_appointments(&self) -> Result<Vec<Appointment>, StoreError> {
            Ok(vec![])
        }
    }

    #[tokio::test]
    async fn create_success_yields_confirmation_navigation() {
        let store = Arc::new(ScriptedStore::default());
        let workflow = AppointmentWorkflow::new(store.clone());

        let outcome = workflow
            .submit(OperationKind::Create, &create_fields(), create_context())
            .await
            .expect("create should succeed");

        let path = outcome.path().expect("confirmation carries a path");
        assert_eq!(
            path,
            format!("/patients/u1/new-appointment/success?appointmentId={FIXED_ID}")
        );
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(workflow.phase(), SubmitPhase::Succeeded);
    }

    #[tokio::test]
    async fn cancel_with_empty_reason_never_reaches_store() {
        let store = Arc::new(ScriptedStore::default());
        let workflow = AppointmentWorkflow::new(store.clone());

        let err = workflow
            .submit(
                OperationKind::Cancel,
                &RawFieldValues {
                    cancellation_reason: Some("  ".into()),
                    ..Default::default()
                },
                SubmitContext {
                    user_id: "u1".into(),
                    patient_id: None,
                    appointment_id: Some(RecordId::parse(FIXED_ID).unwrap()),
                },
            )
            .await
            .expect_err("blank cancellation reason must fail validation");

        match err {
            WorkflowError::Validation(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].field, "cancellationReason");
            }
            other => panic!("expected validation failure, got: {other}"),
        }
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
        assert_eq!(workflow.phase(), SubmitPhase::Failed);
    }

    #[tokio::test]
    async fn schedule_yields_close_and_reset_with_scheduled_command() {
        let store = Arc::new(ScriptedStore {
            existing_status: Mutex::new(Some(AppointmentStatus::Pending)),
            ..Default::default()
        });
        let workflow = AppointmentWorkflow::new(store.clone());

        let outcome = workflow
            .submit(
                OperationKind::Schedule,
                &create_fields(),
                SubmitContext {
                    user_id: "u1".into(),
                    patient_id: None,
                    appointment_id: Some(RecordId::parse(FIXED_ID).unwrap()),
                },
            )
            .await
            .expect("schedule should succeed");

        assert_eq!(outcome, WorkflowOutcome::CloseAndReset);
        assert_eq!(outcome.path(), None);

        let command = store
            .captured_update
            .lock()
            .unwrap()
            .take()
            .expect("update command captured");
        assert_eq!(command.status, AppointmentStatus::Scheduled);
        assert_eq!(command.kind, OperationKind::Schedule);
        assert!(command.cancellation_reason.is_none());
    }

    #[tokio::test]
    async fn second_trigger_while_submitting_fires_exactly_one_store_call() {
        let hold = Arc::new(Notify::new());
        let store = Arc::new(ScriptedStore {
            hold_create: Some(hold.clone()),
            ..Default::default()
        });
        let workflow = Arc::new(AppointmentWorkflow::new(store.clone()));

        let first = {
            let workflow = workflow.clone();
            tokio::spawn(async move {
                workflow
                    .submit(OperationKind::Create, &create_fields(), create_context())
                    .await
            })
        };

        // Let the first submission reach the store suspend point.
        while !workflow.is_submitting() {
            tokio::task::yield_now().await;
        }

        let second = workflow
            .submit(OperationKind::Create, &create_fields(), create_context())
            .await
            .expect_err("second trigger must be rejected while submitting");
        assert!(matches!(second, WorkflowError::SubmissionInFlight));

        hold.notify_one();
        first
            .await
            .expect("task should join")
            .expect("first submission should succeed");

        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);
        assert_eq!(workflow.phase(), SubmitPhase::Succeeded);
    }

    #[tokio::test]
    async fn submission_can_be_retried_after_failure() {
        let store = Arc::new(ScriptedStore::default());
        let workflow = AppointmentWorkflow::new(store.clone());

        let context = SubmitContext {
            user_id: "u1".into(),
            patient_id: None, // missing patient forces a failure
            appointment_id: None,
        };
        let err = workflow
            .submit(OperationKind::Create, &create_fields(), context)
            .await
            .expect_err("create without patient must fail");
        assert!(matches!(err, WorkflowError::MissingPatient));
        assert_eq!(workflow.phase(), SubmitPhase::Failed);

        // The gate re-opens after a failure; an explicit retry is accepted.
        workflow
            .submit(OperationKind::Create, &create_fields(), create_context())
            .await
            .expect("retry should be accepted and succeed");
        assert_eq!(workflow.phase(), SubmitPhase::Succeeded);
    }

    #[tokio::test]
    async fn operations_on_cancelled_appointments_are_rejected() {
        let store = Arc::new(MemoryAppointmentStore::new());
        let workflow = AppointmentWorkflow::new(store.clone());

        let outcome = workflow
            .submit(OperationKind::Create, &create_fields(), create_context())
            .await
            .expect("create should succeed");
        let appointment_id = match outcome {
            WorkflowOutcome::Confirmation { appointment_id, .. } => {
                RecordId::parse(&appointment_id).expect("store returns canonical ids")
            }
            WorkflowOutcome::CloseAndReset => panic!("create must confirm"),
        };

        let update_context = SubmitContext {
            user_id: "u1".into(),
            patient_id: None,
            appointment_id: Some(appointment_id),
        };

        workflow
            .submit(
                OperationKind::Cancel,
                &RawFieldValues {
                    cancellation_reason: Some("Recovered".into()),
                    ..Default::default()
                },
                update_context.clone(),
            )
            .await
            .expect("cancel of a pending appointment should succeed");

        let err = workflow
            .submit(OperationKind::Schedule, &create_fields(), update_context)
            .await
            .expect_err("scheduling a cancelled appointment must be rejected");
        assert!(matches!(
            err,
            WorkflowError::InvalidTransition {
                from: AppointmentStatus::Cancelled,
                attempted: OperationKind::Schedule,
            }
        ));
    }

    #[tokio::test]
    async fn update_without_appointment_id_is_a_contract_violation() {
        let store = Arc::new(ScriptedStore::default());
        let workflow = AppointmentWorkflow::new(store);

        let err = workflow
            .submit(
                OperationKind::Schedule,
                &create_fields(),
                SubmitContext {
                    user_id: "u1".into(),
                    patient_id: None,
                    appointment_id: None,
                },
            )
            .await
            .expect_err("schedule without id must fail");
        assert!(matches!(
            err,
            WorkflowError::MissingAppointment(OperationKind::Schedule)
        ));
    }

    #[test]
    fn confirmation_path_contains_user_and_appointment() {
        let outcome = WorkflowOutcome::Confirmation {
            user_id: "u1".into(),
            appointment_id: "a1".into(),
        };
        let path = outcome.path().unwrap();
        let (route, query) = path.split_once('?').expect("path has a query");

        assert!(route.split('/').any(|segment| segment == "u1"));
        assert_eq!(query, "appointmentId=a1");
    }
}

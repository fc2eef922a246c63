//! # API REST
//!
//! REST API implementation for carebook: the portal's form presentation
//! boundary.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! No business logic lives here: handlers map DTOs onto core workflow and
//! store calls and map the results back onto HTTP. The same router backs the
//! standalone `carebook-api-rest` binary and the combined `carebook-run`
//! binary.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::{
    AppointmentCountsRes, AppointmentRes, CreateAppointmentReq, ErrorRes, FieldErrorRes,
    FieldSpecRes, HealthRes, HealthService, ListAppointmentsRes, PatientRes, RegisterPatientReq,
    SchemaRes, SubmitAppointmentRes, SubmitFields, UpdateAppointmentReq,
};
use carebook_core::repositories::appointments::FsAppointmentStore;
use carebook_core::repositories::patients::PatientDirectory;
use carebook_core::{
    Appointment, AppointmentStore, AppointmentWorkflow, CoreConfig, FieldRequirement,
    NonEmptyText, OperationKind, RawFieldValues, RecordId, StatusTally, StoreError, SubmitContext,
    ValidationSchema, WorkflowError, WorkflowOutcome,
};

/// Application state shared across REST API handlers.
///
/// Holds the workflow controller servicing booking submissions, the store
/// backing the read endpoints and the patient directory for registrations.
#[derive(Clone)]
pub struct AppState {
    workflow: Arc<AppointmentWorkflow>,
    store: Arc<dyn AppointmentStore>,
    patients: Arc<PatientDirectory>,
}

impl AppState {
    /// Builds the state over the durable filesystem store.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let store: Arc<dyn AppointmentStore> = Arc::new(FsAppointmentStore::new(cfg.clone()));
        Self {
            workflow: Arc::new(AppointmentWorkflow::new(store.clone())),
            store,
            patients: Arc::new(PatientDirectory::new(cfg)),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        get_schema,
        create_appointment,
        update_appointment,
        list_appointments,
        appointment_counts,
        get_appointment,
        register_patient,
        list_patients,
    ),
    components(schemas(
        HealthRes,
        SchemaRes,
        FieldSpecRes,
        SubmitFields,
        CreateAppointmentReq,
        UpdateAppointmentReq,
        SubmitAppointmentRes,
        AppointmentRes,
        ListAppointmentsRes,
        AppointmentCountsRes,
        RegisterPatientReq,
        PatientRes,
        ErrorRes,
        FieldErrorRes,
    ))
)]
struct ApiDoc;

/// Builds the carebook REST router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/schemas/:kind", get(get_schema))
        .route("/appointments", post(create_appointment))
        .route("/appointments", get(list_appointments))
        .route("/appointments/counts", get(appointment_counts))
        .route("/appointments/:id", put(update_appointment))
        .route("/appointments/:id", get(get_appointment))
        .route("/patients", post(register_patient))
        .route("/patients", get(list_patients))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

type ApiError = (StatusCode, Json<ErrorRes>);

fn plain_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            error: message.into(),
            field_errors: vec![],
        }),
    )
}

/// Maps a workflow failure onto an HTTP status and error body.
///
/// Validation failures carry per-field errors for inline display; everything
/// else is a single non-field message. After any failure the submit trigger
/// is usable again, so no retry logic lives on the server side.
fn workflow_error(err: WorkflowError) -> ApiError {
    match err {
        WorkflowError::Validation(violations) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorRes {
                error: "validation failed".into(),
                field_errors: violations
                    .into_iter()
                    .map(|v| FieldErrorRes {
                        field: v.field.to_string(),
                        message: v.message,
                    })
                    .collect(),
            }),
        ),
        WorkflowError::SubmissionInFlight => plain_error(
            StatusCode::CONFLICT,
            "a submission is already in flight; wait for it to resolve",
        ),
        WorkflowError::MissingPatient | WorkflowError::MissingAppointment(_) => {
            plain_error(StatusCode::BAD_REQUEST, err.to_string())
        }
        WorkflowError::InvalidTransition { .. } => {
            plain_error(StatusCode::CONFLICT, err.to_string())
        }
        WorkflowError::Store(StoreError::NotFound { id }) => plain_error(
            StatusCode::NOT_FOUND,
            format!("no appointment found with id '{id}'"),
        ),
        WorkflowError::Store(store_err) => {
            tracing::error!("store failure: {:?}", store_err);
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, "store failure")
        }
    }
}

fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound { id } => plain_error(
            StatusCode::NOT_FOUND,
            format!("no appointment found with id '{id}'"),
        ),
        other => {
            tracing::error!("store failure: {:?}", other);
            plain_error(StatusCode::INTERNAL_SERVER_ERROR, "store failure")
        }
    }
}

fn appointment_res(appointment: Appointment) -> AppointmentRes {
    AppointmentRes {
        id: appointment.id.to_string(),
        user_id: appointment.user_id,
        patient: appointment.patient,
        primary_physician: appointment.primary_physician,
        schedule: appointment.schedule.to_rfc3339(),
        reason: appointment.reason,
        note: appointment.note,
        status: appointment.status.as_str().to_string(),
        cancellation_reason: appointment.cancellation_reason,
        created_at: appointment.created_at.to_rfc3339(),
        updated_at: appointment.updated_at.to_rfc3339(),
    }
}

fn raw_fields(fields: SubmitFields) -> RawFieldValues {
    RawFieldValues {
        primary_physician: fields.primary_physician,
        schedule: fields.schedule,
        reason: fields.reason,
        note: fields.note,
        cancellation_reason: fields.cancellation_reason,
    }
}

fn schema_res(schema: &ValidationSchema) -> SchemaRes {
    SchemaRes {
        kind: schema.kind().as_str().to_string(),
        fields: schema
            .fields()
            .iter()
            .map(|spec| FieldSpecRes {
                name: spec.name.to_string(),
                requirement: match spec.requirement {
                    FieldRequirement::Required => "required",
                    FieldRequirement::Optional => "optional",
                    FieldRequirement::Ignored => "ignored",
                }
                .to_string(),
                constraint: match spec.constraint {
                    carebook_core::FieldConstraint::NonEmptyText => "non-empty-text",
                    carebook_core::FieldConstraint::FutureOrPresentTimestamp => {
                        "future-or-present-timestamp"
                    }
                    carebook_core::FieldConstraint::Text => "text",
                }
                .to_string(),
            })
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/schemas/{kind}",
    responses(
        (status = 200, description = "Active validation schema", body = SchemaRes),
        (status = 400, description = "Unknown operation kind", body = ErrorRes)
    )
)]
/// The validation schema active for an operation kind
///
/// The portal frontend fetches this to render inputs conditionally, for
/// example, the cancellation reason field only under `cancel`. An
/// unrecognised kind is a caller contract violation and fails loudly.
async fn get_schema(
    State(_state): State<AppState>,
    AxumPath(kind): AxumPath<String>,
) -> Result<Json<SchemaRes>, ApiError> {
    let kind: OperationKind = kind
        .parse()
        .map_err(|e: carebook_core::UnknownOperation| {
            plain_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;

    Ok(Json(schema_res(&ValidationSchema::for_kind(kind))))
}

#[utoipa::path(
    post,
    path = "/appointments",
    request_body = CreateAppointmentReq,
    responses(
        (status = 201, description = "Appointment created", body = SubmitAppointmentRes),
        (status = 422, description = "Validation failure", body = ErrorRes),
        (status = 409, description = "Submission already in flight", body = ErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Submit a `create` operation
///
/// Validates the booking form against the `create` schema, writes the new
/// appointment through the store and returns the confirmation navigation
/// target.
async fn create_appointment(
    State(state): State<AppState>,
    Json(req): Json<CreateAppointmentReq>,
) -> Result<(StatusCode, Json<SubmitAppointmentRes>), ApiError> {
    let context = SubmitContext {
        user_id: req.user_id,
        patient_id: Some(req.patient_id),
        appointment_id: None,
    };

    let outcome = state
        .workflow
        .submit(OperationKind::Create, &raw_fields(req.fields), context)
        .await
        .map_err(workflow_error)?;

    let (redirect, appointment_id) = match &outcome {
        WorkflowOutcome::Confirmation { appointment_id, .. } => {
            (outcome.path(), appointment_id.clone())
        }
        WorkflowOutcome::CloseAndReset => {
            // The create branch always confirms; reaching this arm is a bug.
            tracing::error!("create submission resolved without a confirmation outcome");
            return Err(plain_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "unexpected workflow outcome",
            ));
        }
    };

    let id = RecordId::parse(&appointment_id)
        .map_err(|e| plain_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;
    let appointment = state.store.fetch_appointment(&id).await.map_err(store_error)?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitAppointmentRes {
            outcome: "confirmation".into(),
            redirect,
            appointment: appointment_res(appointment),
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/appointments/{id}",
    request_body = UpdateAppointmentReq,
    responses(
        (status = 200, description = "Appointment updated", body = SubmitAppointmentRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 404, description = "Unknown appointment", body = ErrorRes),
        (status = 409, description = "Invalid transition or submission in flight", body = ErrorRes),
        (status = 422, description = "Validation failure", body = ErrorRes)
    )
)]
/// Submit a `schedule` or `cancel` operation
///
/// Validates the form against the schema of the requested kind, enforces
/// the appointment state machine and writes the update through the store.
/// On success the portal closes the dialog and resets the form.
async fn update_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(req): Json<UpdateAppointmentReq>,
) -> Result<Json<SubmitAppointmentRes>, ApiError> {
    let kind: OperationKind = req
        .kind
        .parse()
        .map_err(|e: carebook_core::UnknownOperation| {
            plain_error(StatusCode::BAD_REQUEST, e.to_string())
        })?;
    if !kind.targets_existing() {
        return Err(plain_error(
            StatusCode::BAD_REQUEST,
            "kind must be 'schedule' or 'cancel' for this endpoint",
        ));
    }

    let appointment_id = RecordId::parse(&id)
        .map_err(|e| plain_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let context = SubmitContext {
        user_id: req.user_id,
        patient_id: None,
        appointment_id: Some(appointment_id.clone()),
    };

    state
        .workflow
        .submit(kind, &raw_fields(req.fields), context)
        .await
        .map_err(workflow_error)?;

    let appointment = state
        .store
        .fetch_appointment(&appointment_id)
        .await
        .map_err(store_error)?;

    Ok(Json(SubmitAppointmentRes {
        outcome: "closeAndReset".into(),
        redirect: None,
        appointment: appointment_res(appointment),
    }))
}

#[utoipa::path(
    get,
    path = "/appointments",
    responses(
        (status = 200, description = "List of appointments", body = ListAppointmentsRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// List all appointments
///
/// Backs the portal's admin dashboard table, newest first.
async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<ListAppointmentsRes>, ApiError> {
    let appointments = state.store.list_appointments().await.map_err(store_error)?;

    Ok(Json(ListAppointmentsRes {
        total: appointments.len(),
        appointments: appointments.into_iter().map(appointment_res).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/appointments/counts",
    responses(
        (status = 200, description = "Appointment tallies per status", body = AppointmentCountsRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Appointment tallies per lifecycle status
///
/// Backs the dashboard stat cards.
async fn appointment_counts(
    State(state): State<AppState>,
) -> Result<Json<AppointmentCountsRes>, ApiError> {
    let appointments = state.store.list_appointments().await.map_err(store_error)?;
    let tally = StatusTally::of(&appointments);

    Ok(Json(AppointmentCountsRes {
        scheduled_count: tally.scheduled,
        pending_count: tally.pending,
        cancelled_count: tally.cancelled,
    }))
}

#[utoipa::path(
    get,
    path = "/appointments/{id}",
    responses(
        (status = 200, description = "Appointment", body = AppointmentRes),
        (status = 400, description = "Invalid id", body = ErrorRes),
        (status = 404, description = "Unknown appointment", body = ErrorRes)
    )
)]
/// Fetch a single appointment by id
async fn get_appointment(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<AppointmentRes>, ApiError> {
    let id = RecordId::parse(&id)
        .map_err(|e| plain_error(StatusCode::BAD_REQUEST, e.to_string()))?;

    let appointment = state.store.fetch_appointment(&id).await.map_err(store_error)?;
    Ok(Json(appointment_res(appointment)))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = RegisterPatientReq,
    responses(
        (status = 201, description = "Patient registered", body = PatientRes),
        (status = 400, description = "Bad request", body = ErrorRes),
        (status = 500, description = "Store failure", body = ErrorRes)
    )
)]
/// Register a new patient
///
/// Patients register once with their contact details before booking.
async fn register_patient(
    State(state): State<AppState>,
    Json(req): Json<RegisterPatientReq>,
) -> Result<(StatusCode, Json<PatientRes>), ApiError> {
    let name = NonEmptyText::new(&req.name)
        .map_err(|_| plain_error(StatusCode::BAD_REQUEST, "name cannot be empty"))?;

    match state.patients.register(name, &req.email, &req.phone) {
        Ok(patient) => Ok((
            StatusCode::CREATED,
            Json(PatientRes {
                id: patient.id.to_string(),
                name: patient.name,
                email: patient.email,
                phone: patient.phone,
                created_at: patient.created_at.to_rfc3339(),
            }),
        )),
        Err(carebook_core::BookingError::InvalidInput(message)) => {
            Err(plain_error(StatusCode::BAD_REQUEST, message))
        }
        Err(e) => {
            tracing::error!("register patient error: {:?}", e);
            Err(plain_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            ))
        }
    }
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of registered patients", body = [PatientRes])
    )
)]
/// List all registered patients
async fn list_patients(State(state): State<AppState>) -> Json<Vec<PatientRes>> {
    let patients = state
        .patients
        .list()
        .into_iter()
        .map(|p| PatientRes {
            id: p.id.to_string(),
            name: p.name,
            email: p.email,
            phone: p.phone,
            created_at: p.created_at.to_rfc3339(),
        })
        .collect();
    Json(patients)
}

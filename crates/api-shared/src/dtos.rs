//! Request and response DTOs for the carebook REST API.
//!
//! Wire names are camelCase throughout; timestamps travel as RFC 3339
//! strings and are only parsed inside the core validation layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Raw booking form values as submitted by the portal frontend.
///
/// Which fields must be present depends on the operation kind; the core
/// validation schema decides, not this type.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_physician: Option<String>,
    /// RFC 3339 timestamp, e.g. `2026-09-01T10:00:00Z`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

/// Request body for creating an appointment.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentReq {
    pub user_id: String,
    pub patient_id: String,
    pub fields: SubmitFields,
}

/// Request body for scheduling or cancelling an existing appointment.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentReq {
    pub user_id: String,
    /// `schedule` or `cancel`.
    pub kind: String,
    pub fields: SubmitFields,
}

/// A materialised appointment.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRes {
    pub id: String,
    pub user_id: String,
    pub patient: String,
    pub primary_physician: String,
    /// RFC 3339 timestamp.
    pub schedule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// `pending`, `scheduled` or `cancelled`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Response to a successful appointment submission.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAppointmentRes {
    /// `confirmation` for a creation, `closeAndReset` for an update.
    pub outcome: String,
    /// Navigation target for a confirmation outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub appointment: AppointmentRes,
}

/// List of appointments.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsRes {
    pub total: usize,
    pub appointments: Vec<AppointmentRes>,
}

/// Appointment tallies for the portal dashboard.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentCountsRes {
    pub scheduled_count: usize,
    pub pending_count: usize,
    pub cancelled_count: usize,
}

/// One field's requirement in the active validation schema.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpecRes {
    pub name: String,
    /// `required`, `optional` or `ignored`.
    pub requirement: String,
    /// `non-empty-text`, `future-or-present-timestamp` or `text`.
    pub constraint: String,
}

/// The validation schema active for one operation kind.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaRes {
    pub kind: String,
    pub fields: Vec<FieldSpecRes>,
}

/// Request body for patient registration.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPatientReq {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A registered patient.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientRes {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
}

/// One field-level validation error.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorRes {
    pub field: String,
    pub message: String,
}

/// Error response body.
///
/// `field_errors` is populated only for validation failures; store and
/// transition failures carry a single top-level message.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRes {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldErrorRes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_fields_use_camel_case_wire_names() {
        let fields: SubmitFields = serde_json::from_str(
            r#"{"primaryPhysician":"Dr. Cameron","cancellationReason":"conflict"}"#,
        )
        .expect("camelCase body should deserialise");

        assert_eq!(fields.primary_physician.as_deref(), Some("Dr. Cameron"));
        assert_eq!(fields.cancellation_reason.as_deref(), Some("conflict"));
    }

    #[test]
    fn error_res_omits_empty_field_errors() {
        let body = serde_json::to_string(&ErrorRes {
            error: "store failure".into(),
            field_errors: vec![],
        })
        .expect("serialise");
        assert_eq!(body, r#"{"error":"store failure"}"#);
    }
}

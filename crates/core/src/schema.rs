//! Validation rule selection.
//!
//! Each [`OperationKind`] activates a different set of field requirements:
//! a creation asks for physician, time and reason; a confirmation no longer
//! needs the reason; a cancellation only needs to know why. The schema is
//! derived once per operation kind, is immutable, and has no side effects,
//! so the form adapter can also fetch it to render inputs conditionally.

use crate::fields::{field_names, FieldViolation, RawFieldValues, ValidatedFields};
use crate::operation::OperationKind;
use crate::validation::{optional_text, require_non_empty, require_schedule};
use carebook_types::NonEmptyText;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Whether a field must be supplied, may be supplied, or is not looked at.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRequirement {
    Required,
    Optional,
    Ignored,
}

/// The shape a supplied value must have.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldConstraint {
    /// Free text that must contain at least one non-whitespace character.
    NonEmptyText,
    /// RFC 3339 timestamp that is not in the past.
    FutureOrPresentTimestamp,
    /// Unconstrained free text.
    Text,
}

/// Requirement and constraint for a single named field.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub requirement: FieldRequirement,
    pub constraint: FieldConstraint,
}

const fn spec(
    name: &'static str,
    requirement: FieldRequirement,
    constraint: FieldConstraint,
) -> FieldSpec {
    FieldSpec {
        name,
        requirement,
        constraint,
    }
}

/// The set of field requirements active for one operation kind.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ValidationSchema {
    kind: OperationKind,
    fields: Vec<FieldSpec>,
}

impl ValidationSchema {
    /// Returns the schema active for `kind`.
    ///
    /// Pure function: calling it twice with the same kind yields identical
    /// field requirements. The match is exhaustive over the closed enum.
    pub fn for_kind(kind: OperationKind) -> Self {
        use FieldConstraint::{FutureOrPresentTimestamp, NonEmptyText, Text};
        use FieldRequirement::{Ignored, Optional, Required};

        let fields = match kind {
            OperationKind::Create => vec![
                spec(field_names::PRIMARY_PHYSICIAN, Required, NonEmptyText),
                spec(field_names::SCHEDULE, Required, FutureOrPresentTimestamp),
                spec(field_names::REASON, Required, NonEmptyText),
                spec(field_names::NOTE, Optional, Text),
                spec(field_names::CANCELLATION_REASON, Ignored, Text),
            ],
            // The appointment already exists and is merely being confirmed,
            // so the reason no longer has to be restated.
            OperationKind::Schedule => vec![
                spec(field_names::PRIMARY_PHYSICIAN, Required, NonEmptyText),
                spec(field_names::SCHEDULE, Required, FutureOrPresentTimestamp),
                spec(field_names::REASON, Optional, Text),
                spec(field_names::NOTE, Optional, Text),
                spec(field_names::CANCELLATION_REASON, Ignored, Text),
            ],
            OperationKind::Cancel => vec![
                spec(field_names::PRIMARY_PHYSICIAN, Ignored, Text),
                spec(field_names::SCHEDULE, Ignored, Text),
                spec(field_names::REASON, Ignored, Text),
                spec(field_names::NOTE, Ignored, Text),
                spec(field_names::CANCELLATION_REASON, Required, NonEmptyText),
            ],
        };

        Self { kind, fields }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Validates raw form values against this schema.
    ///
    /// All violations are collected, not just the first, so the form can
    /// mark every offending input in one pass. Fields the schema ignores are
    /// dropped regardless of what the form supplied. `now` is injected for
    /// the timestamp check.
    ///
    /// # Errors
    ///
    /// Returns the full list of per-field violations if any field fails its
    /// requirement or constraint.
    pub fn validate(
        &self,
        raw: &RawFieldValues,
        now: DateTime<Utc>,
    ) -> Result<ValidatedFields, Vec<FieldViolation>> {
        let mut validated = ValidatedFields::default();
        let mut violations = Vec::new();

        for field_spec in &self.fields {
            let value = raw.get(field_spec.name);

            match field_spec.requirement {
                FieldRequirement::Ignored => continue,
                FieldRequirement::Optional => {
                    self.apply_optional(field_spec, value, now, &mut validated)
                }
                FieldRequirement::Required => {
                    if let Err(violation) =
                        self.apply_required(field_spec, value, now, &mut validated)
                    {
                        violations.push(violation);
                    }
                }
            }
        }

        if violations.is_empty() {
            Ok(validated)
        } else {
            Err(violations)
        }
    }

    fn apply_required(
        &self,
        field_spec: &FieldSpec,
        value: Option<&str>,
        now: DateTime<Utc>,
        validated: &mut ValidatedFields,
    ) -> Result<(), FieldViolation> {
        match (field_spec.name, field_spec.constraint) {
            (field_names::PRIMARY_PHYSICIAN, _) => {
                validated.primary_physician = Some(require_non_empty(field_spec.name, value)?);
            }
            (field_names::SCHEDULE, _) => {
                validated.schedule = Some(require_schedule(field_spec.name, value, now)?);
            }
            (field_names::REASON, _) => {
                validated.reason = Some(require_non_empty(field_spec.name, value)?);
            }
            (field_names::CANCELLATION_REASON, _) => {
                validated.cancellation_reason = Some(require_non_empty(field_spec.name, value)?);
            }
            // note is never required by any schema
            (field_names::NOTE, _) => {
                validated.note = optional_text(value);
            }
            _ => {}
        }
        Ok(())
    }

    fn apply_optional(
        &self,
        field_spec: &FieldSpec,
        value: Option<&str>,
        _now: DateTime<Utc>,
        validated: &mut ValidatedFields,
    ) {
        // Optional values that are blank after trimming are treated as absent.
        match field_spec.name {
            field_names::REASON => {
                validated.reason = value.and_then(|raw| NonEmptyText::new(raw).ok());
            }
            field_names::NOTE => validated.note = optional_text(value),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()
    }

    fn valid_create_fields() -> RawFieldValues {
        RawFieldValues {
            primary_physician: Some("Dr. Leila Cameron".into()),
            schedule: Some("2026-08-15T09:00:00Z".into()),
            reason: Some("Annual check-up".into()),
            note: Some("Prefers mornings".into()),
            cancellation_reason: None,
        }
    }

    fn requirement_of(schema: &ValidationSchema, name: &str) -> FieldRequirement {
        schema
            .fields()
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.requirement)
            .expect("field present in schema")
    }

    #[test]
    fn create_schema_requires_physician_schedule_and_reason() {
        let schema = ValidationSchema::for_kind(OperationKind::Create);

        assert_eq!(
            requirement_of(&schema, field_names::PRIMARY_PHYSICIAN),
            FieldRequirement::Required
        );
        assert_eq!(
            requirement_of(&schema, field_names::SCHEDULE),
            FieldRequirement::Required
        );
        assert_eq!(
            requirement_of(&schema, field_names::REASON),
            FieldRequirement::Required
        );
        assert_eq!(
            requirement_of(&schema, field_names::NOTE),
            FieldRequirement::Optional
        );
        assert_eq!(
            requirement_of(&schema, field_names::CANCELLATION_REASON),
            FieldRequirement::Ignored
        );
    }

    #[test]
    fn schedule_schema_relaxes_reason() {
        let schema = ValidationSchema::for_kind(OperationKind::Schedule);

        assert_eq!(
            requirement_of(&schema, field_names::REASON),
            FieldRequirement::Optional
        );
        assert_eq!(
            requirement_of(&schema, field_names::SCHEDULE),
            FieldRequirement::Required
        );
    }

    #[test]
    fn cancel_schema_only_requires_cancellation_reason() {
        let schema = ValidationSchema::for_kind(OperationKind::Cancel);

        assert_eq!(
            requirement_of(&schema, field_names::CANCELLATION_REASON),
            FieldRequirement::Required
        );
        for name in [
            field_names::PRIMARY_PHYSICIAN,
            field_names::SCHEDULE,
            field_names::REASON,
            field_names::NOTE,
        ] {
            assert_eq!(requirement_of(&schema, name), FieldRequirement::Ignored);
        }
    }

    #[test]
    fn for_kind_is_pure() {
        let first = ValidationSchema::for_kind(OperationKind::Schedule);
        let second = ValidationSchema::for_kind(OperationKind::Schedule);
        assert_eq!(first, second);
    }

    #[test]
    fn validate_accepts_valid_create_submission() {
        let schema = ValidationSchema::for_kind(OperationKind::Create);
        let validated = schema
            .validate(&valid_create_fields(), fixed_now())
            .expect("valid submission should pass");

        assert_eq!(
            validated.primary_physician.as_ref().map(|p| p.as_str()),
            Some("Dr. Leila Cameron")
        );
        assert!(validated.schedule.is_some());
        assert_eq!(
            validated.reason.as_ref().map(|r| r.as_str()),
            Some("Annual check-up")
        );
        assert_eq!(validated.note.as_deref(), Some("Prefers mornings"));
        assert!(validated.cancellation_reason.is_none());
    }

    #[test]
    fn validate_collects_all_violations() {
        let schema = ValidationSchema::for_kind(OperationKind::Create);
        let violations = schema
            .validate(&RawFieldValues::default(), fixed_now())
            .expect_err("empty submission should fail");

        let fields: Vec<&str> = violations.iter().map(|v| v.field).collect();
        assert_eq!(
            fields,
            vec![
                field_names::PRIMARY_PHYSICIAN,
                field_names::SCHEDULE,
                field_names::REASON
            ]
        );
    }

    #[test]
    fn validate_rejects_empty_cancellation_reason() {
        let schema = ValidationSchema::for_kind(OperationKind::Cancel);
        let fields = RawFieldValues {
            cancellation_reason: Some("   ".into()),
            ..Default::default()
        };

        let violations = schema
            .validate(&fields, fixed_now())
            .expect_err("blank cancellation reason should fail");

        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, field_names::CANCELLATION_REASON);
    }

    #[test]
    fn cancel_ignores_other_fields_entirely() {
        let schema = ValidationSchema::for_kind(OperationKind::Cancel);
        let fields = RawFieldValues {
            // Invalid under create; must not be looked at under cancel.
            schedule: Some("not a timestamp".into()),
            cancellation_reason: Some("Feeling better".into()),
            ..Default::default()
        };

        let validated = schema
            .validate(&fields, fixed_now())
            .expect("only the cancellation reason is validated");
        assert!(validated.schedule.is_none());
        assert_eq!(
            validated.cancellation_reason.as_ref().map(|r| r.as_str()),
            Some("Feeling better")
        );
    }

    #[test]
    fn validate_rejects_past_schedule_on_create() {
        let schema = ValidationSchema::for_kind(OperationKind::Create);
        let mut fields = valid_create_fields();
        fields.schedule = Some("2026-07-01T09:00:00Z".into());

        let violations = schema
            .validate(&fields, fixed_now())
            .expect_err("past schedule should fail");
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].field, field_names::SCHEDULE);
    }
}

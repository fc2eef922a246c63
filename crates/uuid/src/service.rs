//! Internal implementation of record identifiers.

use crate::{IdError, IdResult};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// carebook's canonical record identifier (32 lowercase hex characters, no
/// hyphens).
///
/// This wrapper guarantees that once constructed, the contained UUID is in
/// canonical form, and provides consistent sharded path derivation across
/// the system.
///
/// # When to use this type
/// Use this wrapper whenever you are:
/// - Accepting an identifier string from *outside* the core (CLI input, API
///   request), or
/// - Deriving a sharded storage path for an appointment or patient record, or
/// - Allocating a fresh identifier for a new record.
///
/// # Construction
/// - [`RecordId::new`] generates a new canonical id (for new records).
/// - [`RecordId::parse`] validates an externally supplied identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RecordId(Uuid);

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordId {
    /// Generates a new identifier in canonical form.
    ///
    /// Suitable for allocating a fresh identifier when an appointment or
    /// patient record is created. Follows RFC 4122 version 4.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses an identifier that must already be in canonical
    /// form.
    ///
    /// This does **not** normalise other common UUID forms (hyphenated or
    /// uppercase); callers must provide the canonical representation.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::InvalidInput`] if `input` is not canonical.
    pub fn parse(input: &str) -> IdResult<Self> {
        if Self::is_canonical(input) {
            // SAFETY: is_canonical guarantees valid hex, so parse_str will succeed
            let uuid = Uuid::parse_str(input).expect("is_canonical guarantees valid UUID");
            return Ok(Self(uuid));
        }
        Err(IdError::InvalidInput(format!(
            "record id must be 32 lowercase hex characters without hyphens, got: '{}'",
            input
        )))
    }

    /// Returns the identifier as a `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic check: exactly 32 bytes, lowercase hex only. Fast
    /// enough for pre-validation before calling [`RecordId::parse`].
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<id>/` where `s1`/`s2` are derived from
    /// this identifier.
    ///
    /// Sharding scheme:
    /// - `s1` is the first two hex characters of the id
    /// - `s2` is the next two hex characters
    /// - The full id forms the leaf directory
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for RecordId {
    /// Formats the identifier in canonical form (32 lowercase hex characters).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for RecordId {
    type Err = IdError;

    /// Parses a string into a `RecordId`, requiring canonical form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RecordId::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_generates_canonical_id() {
        let id = RecordId::new();
        let canonical = id.to_string();

        assert_eq!(canonical.len(), 32);
        assert!(RecordId::is_canonical(&canonical));
    }

    #[test]
    fn test_parse_valid_canonical_id() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let result = RecordId::parse(canonical);

        assert!(result.is_ok());
        assert_eq!(result.unwrap().to_string(), canonical);
    }

    #[test]
    fn test_parse_rejects_hyphenated_uuid() {
        let err = RecordId::parse("550e8400-e29b-41d4-a716-446655440000")
            .expect_err("hyphenated form should be rejected");
        assert!(matches!(err, IdError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_rejects_uppercase_hex() {
        let err = RecordId::parse("550E8400E29B41D4A716446655440000")
            .expect_err("uppercase form should be rejected");
        assert!(matches!(err, IdError::InvalidInput(_)));
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        let err = RecordId::parse("550e8400").expect_err("short input should be rejected");
        assert!(matches!(err, IdError::InvalidInput(_)));
    }

    #[test]
    fn test_sharded_dir_layout() {
        let id = RecordId::parse("550e8400e29b41d4a716446655440000").unwrap();
        let dir = id.sharded_dir(Path::new("/data/appointments"));

        assert_eq!(
            dir,
            PathBuf::from("/data/appointments/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn test_serde_round_trip() {
        let id = RecordId::new();
        let json = serde_json::to_string(&id).expect("serialize");
        let back: RecordId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(id, back);
    }
}

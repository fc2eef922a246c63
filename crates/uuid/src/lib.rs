//! Record identifiers and sharded-path utilities.
//!
//! carebook stores booking records under sharded directories derived from a
//! UUID. To keep path derivation deterministic and consistent across the
//! codebase, a *canonical* representation is used for storage identifiers:
//! **32 lowercase hexadecimal characters** (no hyphens).
//!
//! This crate provides:
//! - A wrapper type ([`RecordId`]) that *guarantees* the canonical format
//!   once constructed.
//! - Shared sharding logic to derive record directory locations from an
//!   identifier.
//!
//! ## Canonical form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! This is the same value you would get from
//! `Uuid::new_v4().simple().to_string()`. Canonical form is *required* for
//! externally supplied identifiers (CLI or API inputs); use
//! [`RecordId::parse`] to validate them. Non-canonical values (uppercase,
//! hyphenated, wrong length, non-hex) are rejected.
//!
//! ## Sharded directory layout
//! For a canonical id `u`, records live under
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, which prevents very large fan-out
//! in a single directory as the portal accumulates appointments.

mod service;

pub use service::{RecordId, Uuid};

/// Error type for record identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum IdError {
    /// Invalid input provided
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for record identifier operations.
pub type IdResult<T> = Result<T, IdError>;

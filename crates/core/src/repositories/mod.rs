//! Durable record repositories.
//!
//! Pure data operations over the sharded, git-versioned booking data
//! directory - no API concerns. HTTP-level logic belongs in `api-rest`.

pub mod appointments;
mod helpers;
pub mod patients;

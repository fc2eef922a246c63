//! # API Shared
//!
//! Shared definitions for carebook APIs.
//!
//! Contains:
//! - Request/response DTOs (`dtos` module) with serde and OpenAPI schema
//!   derives
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the combined `carebook-run` binary. The DTOs use
//! camelCase wire names because the portal frontend consumes them directly.

pub mod dtos;
pub mod health;

pub use dtos::*;
pub use health::HealthService;

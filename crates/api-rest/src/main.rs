//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the carebook REST API server on its own, with OpenAPI/Swagger UI.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST surface.
//! The workspace's main `carebook-run` binary wires up the same router.

use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use carebook_core::constants::{DEFAULT_BOOKING_DATA_DIR, DEFAULT_CLINIC_LABEL};
use carebook_core::{CoreConfig, NonEmptyText};

/// Main entry point for the carebook REST API server
///
/// Starts the REST API server on the configured address (default:
/// 0.0.0.0:3000) and serves booking operations with OpenAPI documentation.
///
/// # Environment Variables
/// - `CAREBOOK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CAREBOOK_DATA_DIR`: Booking data directory (default: "booking_data")
/// - `CAREBOOK_CLINIC`: Clinic label recorded in record audit trails
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the booking data directory cannot be created,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CAREBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting carebook REST API on {}", addr);

    let booking_data_dir = std::env::var("CAREBOOK_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_BOOKING_DATA_DIR));
    std::fs::create_dir_all(&booking_data_dir)?;

    let clinic_label = std::env::var("CAREBOOK_CLINIC")
        .ok()
        .map(NonEmptyText::new)
        .transpose()?
        .unwrap_or_else(|| {
            NonEmptyText::new(DEFAULT_CLINIC_LABEL).expect("default clinic label is non-empty")
        });

    let cfg = Arc::new(CoreConfig::new(booking_data_dir, clinic_label)?);
    let app = router(AppState::new(cfg));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

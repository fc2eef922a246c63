use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{router, AppState};
use carebook_core::constants::{DEFAULT_BOOKING_DATA_DIR, DEFAULT_CLINIC_LABEL};
use carebook_core::{CoreConfig, NonEmptyText};

/// Main entry point for the carebook application
///
/// Starts the portal backend: the REST API that serves the booking form
/// (appointment submissions, validation schemas, dashboard reads) together
/// with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `CAREBOOK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CAREBOOK_DATA_DIR`: Directory for booking data storage (default: "booking_data")
/// - `CAREBOOK_CLINIC`: Clinic label recorded in record audit trails
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carebook=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("CAREBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Starting carebook REST on {}", rest_addr);

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

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

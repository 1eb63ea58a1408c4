//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the TherapistHelper client directory REST API.
//!
//! ## Intended use
//! Useful for development when only the REST server (with OpenAPI/Swagger UI) is wanted. The
//! workspace's `therapist-run` binary starts the same server.

use api_rest::{router, ApiConfig, AppState};
use std::sync::Arc;
use therapist_core::{ClientService, CoreConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the TherapistHelper REST API server
///
/// # Environment Variables
/// - `THERAPIST_REST_ADDR`: Server address (default: "0.0.0.0:8000")
/// - `CLIENT_DATA_DIR`: Client storage directory (default: "client_data")
/// - `ALLOWED_ORIGINS`: Comma-separated CORS origins
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the configuration or client store cannot be resolved,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("therapist_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_cfg = ApiConfig::from_env()?;
    let core_cfg = Arc::new(CoreConfig::new(api_cfg.client_data_dir.clone())?);
    let clients = ClientService::open(core_cfg)?;

    tracing::info!("-- Starting TherapistHelper REST API on {}", api_cfg.addr);

    let app = router(AppState::new(clients), api_cfg.allowed_origins);
    let listener = tokio::net::TcpListener::bind(&api_cfg.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{ApiConfig, AppState, router};
use therapist_core::{ClientService, CoreConfig};

/// Main entry point for the TherapistHelper application
///
/// Starts the client directory REST server and runs until Ctrl-C.
///
/// # Environment Variables
/// - `THERAPIST_REST_ADDR`: REST server address (default: "0.0.0.0:8000")
/// - `CLIENT_DATA_DIR`: Directory for client data storage (default: "client_data")
/// - `ALLOWED_ORIGINS`: Comma-separated CORS origins
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If server startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("therapist_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("therapist_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let api_cfg = ApiConfig::from_env()?;
    let core_cfg = Arc::new(CoreConfig::new(api_cfg.client_data_dir.clone())?);
    let clients = ClientService::open(core_cfg)?;

    tracing::info!("++ Starting TherapistHelper REST on {}", api_cfg.addr);
    tracing::info!("++ Client data in {}", api_cfg.client_data_dir.display());

    let app = router(AppState::new(clients), api_cfg.allowed_origins);
    let listener = tokio::net::TcpListener::bind(&api_cfg.addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("-- Shutting down TherapistHelper REST");
        })
        .await?;

    Ok(())
}

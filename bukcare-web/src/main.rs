use anyhow::Context;
use bukcare_web::config::get_configuration;
use bukcare_web::services::metrics::init_metrics;
use bukcare_web::startup::build_router;
use bukcare_web::AppState;
use dotenvy::dotenv;
use service_core::observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        &configuration.telemetry.service_name,
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    init_metrics().context("Failed to register metrics")?;

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let backend_url = configuration.backend.url.clone();

    let state = AppState::new(configuration).context("Failed to build backend client")?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!(backend = %backend_url, "Starting bukcare-web on {}", address);
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}

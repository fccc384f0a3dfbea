// Headless runner - Dependency injection and engine startup
use std::sync::Arc;

use sensor_dashboard::infrastructure::config::load_dashboard_config;
use sensor_dashboard::infrastructure::rtdb_repository::RtdbRepository;
use sensor_dashboard::presentation::chart_log::TracingChartSink;
use sensor_dashboard::Dashboard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_dashboard_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(RtdbRepository::new(&config.store)?);

    // Wire the engine (application layer) behind the facade
    let dashboard = Dashboard::new(&config, repository.clone(), Arc::new(TracingChartSink));

    // Follow the device list; selecting the first board starts the refresh loop
    let registry = dashboard.registry.clone();
    let directory = tokio::spawn(async move { registry.run(repository.as_ref()).await });

    tracing::info!("Dashboard engine running against {}", config.store.database_url);
    tokio::signal::ctrl_c().await?;

    dashboard.set_visible(false);
    directory.abort();
    Ok(())
}

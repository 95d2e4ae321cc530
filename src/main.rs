use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use disctracker::api;
use disctracker::config::Config;
use disctracker::storage;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("disctracker=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    info!("Loaded configuration");

    info!("Initializing database...");
    let storage = storage::connect(&config.database).await?;
    info!("Database initialized successfully");

    let router = api::create_api_router(storage, config.pagination.clone());

    let addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("🚀 API server listening on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! fwasset Server
//!
//! Loads the web asset manifest and registry and serves the inspection API

use anyhow::Result;
use fwasset_server::{api, config::ServerConfig, state};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting fwasset server");

    let config = ServerConfig::load()?;
    let addr = config.bind;

    // Create application state
    let state = state::AppState::new(config)?;
    {
        let registry = state.registry.read().await;
        match registry.version() {
            Some(version) => info!("Web UI version {}", version),
            None => info!("Web UI version unknown"),
        }
    }

    // Build the router
    let app = api::create_router(state);

    // Start server
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

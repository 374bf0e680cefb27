use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use family_planner_backend::config::ServerConfig;
use family_planner_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from_env();
    info!("Starting family planner backend: {:?}", config);

    let state = initialize_backend(&config).await?;
    let app = create_router(&config, state)?;

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

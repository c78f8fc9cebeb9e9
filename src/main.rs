use std::net::SocketAddr;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use aralin::config::{Cli, Config};
use aralin::routes;
use aralin::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Parse CLI args and load config
    let cli = Cli::parse();
    let config = Config::load(&cli)?;

    if config.auth.enforce_admin {
        tracing::info!("Admin endpoints require an admin X-User-Id");
    } else {
        tracing::warn!("Admin endpoints are not authorization-checked (auth.enforce_admin = false)");
    }

    // Build app state and router
    let state = AppState::from_config(config.clone());
    let app = routes::app(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

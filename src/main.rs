use anyhow::{Context, Result};
use session_locale::config::Config;
use session_locale::server::{self, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("session_locale=info".parse()?),
        )
        .init();

    info!("Starting session-locale server");

    // Load configuration from environment
    let config = Config::from_env()?;
    let port = config.port;

    // Register supported languages before the first request is served
    let state = AppState::new(config).context("Failed to register supported languages")?;
    info!(
        "✓ {} languages registered (default: {})",
        state.registry.len(),
        state.registry.default_language()
    );

    let _purge = server::spawn_session_purge(state.sessions.clone(), Duration::from_secs(60));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context(format!("Failed to bind {}", addr))?;
    info!("✓ Listening on {}", addr);

    axum::serve(listener, server::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

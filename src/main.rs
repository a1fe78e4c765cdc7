mod config;
mod state;
mod routes;
mod handlers;
mod error;
mod openai_service;
mod asr;
mod llm;
mod translate;

use anyhow::Result;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("whisper_translate_backend=debug,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Loaded once; credentials are never re-read while serving.
    let config = Config::from_env()?;

    let app_state = AppState::new(config.clone());
    let app = routes::build_app(app_state);

    let system_config = &config.system_config;
    let addr: SocketAddr = format!("{}:{}", system_config.host, system_config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid listen address {}:{}: {}", system_config.host, system_config.port, e))?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
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

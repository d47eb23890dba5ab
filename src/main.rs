//! pingpong-gateway server entry point.
//!
//! Loads configuration, installs the tracing subscriber, and serves the
//! HTTP and WebSocket endpoints.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use pingpong_gateway::config::{LogFormat, ServerConfig};
use pingpong_gateway::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = ServerConfig::from_env().context("failed to load configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().with_env_filter(filter).json().init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }

    tracing::info!(
        addr = %config.listen_addr,
        pong_scope = %config.pong_scope,
        "starting pingpong-gateway"
    );

    // Build router
    let app = server::build_app(&config);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    server::serve(listener, app).await.context("server error")?;

    Ok(())
}

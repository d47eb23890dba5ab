//! Router assembly and the serve loop.

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::ServerConfig;
use crate::ws::handler::{socketio_handler, ws_handler};

/// Builds the complete application: HTTP routes, WebSocket endpoints, and
/// the tracing, CORS, and timeout middleware.
pub fn build_app(config: &ServerConfig) -> Router {
    let app_state = AppState::from_config(config);

    Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .route("/socket.io", get(socketio_handler))
        .route("/socket.io/", get(socketio_handler))
        .layer(timeout_layer(config.http_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

/// Answers `408 Request Timeout` for requests that outlive `timeout`.
fn timeout_layer(timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout)
}

/// Serves `app` on `listener` until the process receives Ctrl-C.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

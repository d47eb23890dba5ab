//! System endpoints: health check.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Body returned by the health check.
pub const HEALTH_MESSAGE: &str = "Backend is alive";

/// Health check response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Fixed liveness message.
    #[schema(example = "Backend is alive")]
    pub message: String,
}

/// `GET /`: liveness check.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Health check",
    description = "Returns a fixed message while the process is running.",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            message: HEALTH_MESSAGE.to_string(),
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(health_handler))
}

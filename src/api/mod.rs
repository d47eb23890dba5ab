//! HTTP API layer: health route, OpenAPI document, and router composition.

pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::{ErrorBody, ErrorResponse};

/// OpenAPI document for the HTTP surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "pingpong-gateway",
        description = "Health check and ping/pong echo over WebSocket"
    ),
    paths(
        handlers::system::health_handler,
        crate::ws::handler::socketio_handler,
    ),
    components(schemas(handlers::system::HealthResponse, ErrorResponse, ErrorBody)),
    tags(
        (name = "System", description = "Liveness probing"),
        (name = "Realtime", description = "WebSocket event endpoints"),
    )
)]
pub struct ApiDoc;

/// Builds the router with every HTTP route, plus Swagger UI when the
/// `swagger-ui` feature is enabled.
pub fn build_router() -> Router<AppState> {
    let router = Router::new().merge(handlers::routes());

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}

//! Axum WebSocket upgrade handlers.

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use utoipa::IntoParams;

use super::connection::run_connection;
use super::engineio::PROTOCOL_VERSION;
use super::envelope::EnvelopeTransport;
use super::socketio::SocketIoSession;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, ServerError};

/// The only Engine.IO transport this server accepts.
const WEBSOCKET_TRANSPORT: &str = "websocket";

/// `GET /ws`: upgrade HTTP connection to a JSON-envelope WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| run_connection(socket, EnvelopeTransport::new(), state))
}

/// Engine.IO handshake query string.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HandshakeQuery {
    /// Engine.IO protocol revision. Must be `4`.
    #[serde(rename = "EIO")]
    pub eio: Option<String>,
    /// Requested transport. Must be `websocket`.
    pub transport: Option<String>,
}

impl HandshakeQuery {
    /// Checks that the client speaks Engine.IO v4 over the websocket
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::UnsupportedProtocolVersion`] or
    /// [`ServerError::UnsupportedTransport`].
    pub fn validate(&self) -> Result<(), ServerError> {
        let eio = self.eio.as_deref().unwrap_or_default();
        if eio != PROTOCOL_VERSION {
            return Err(ServerError::UnsupportedProtocolVersion(eio.to_string()));
        }
        let transport = self.transport.as_deref().unwrap_or_default();
        if transport != WEBSOCKET_TRANSPORT {
            return Err(ServerError::UnsupportedTransport(transport.to_string()));
        }
        Ok(())
    }
}

/// `GET /socket.io/`: upgrade to a Socket.IO session.
///
/// The query is validated before the upgrade headers, so a plain HTTP
/// request with a bad query gets a JSON error rather than an upgrade
/// rejection.
///
/// # Errors
///
/// Returns [`ServerError`] when the handshake query is not
/// `EIO=4&transport=websocket`.
#[utoipa::path(
    get,
    path = "/socket.io/",
    tag = "Realtime",
    summary = "Socket.IO websocket endpoint",
    description = "Upgrades to an Engine.IO v4 websocket session. Send `42[\"ping\",{\"msg\":\"...\"}]` and receive `42[\"pong\",{\"msg\":\"...\"}]`.",
    params(HandshakeQuery),
    responses(
        (status = 101, description = "Switching protocols"),
        (status = 400, description = "Unsupported protocol version or transport", body = ErrorResponse),
    )
)]
pub async fn socketio_handler(
    Query(query): Query<HandshakeQuery>,
    State(state): State<AppState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ServerError> {
    query.validate()?;
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let session = SocketIoSession::new(state.transport);
    tracing::debug!(sid = %session.sid(), "socket.io handshake accepted");
    Ok(ws
        .on_upgrade(move |socket| run_connection(socket, session, state))
        .into_response())
}

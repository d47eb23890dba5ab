//! Error types with HTTP status code mapping.
//!
//! [`ServerError`] is the only error that ever reaches an HTTP client. It
//! covers rejected Socket.IO handshakes. [`ConfigError`] is raised at startup
//! and [`FrameError`] stays inside the WebSocket layer: undecodable frames are
//! logged and dropped, never reported to the peer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "unsupported transport: polling"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-facing error enum.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The client asked for an Engine.IO protocol revision other than 4.
    #[error("unsupported protocol version: {0}")]
    UnsupportedProtocolVersion(String),

    /// The client asked for a transport other than `websocket`.
    #[error("unsupported transport: {0}")]
    UnsupportedTransport(String),
}

impl ServerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::UnsupportedProtocolVersion(_) => 1001,
            Self::UnsupportedTransport(_) => 1002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedProtocolVersion(_) | Self::UnsupportedTransport(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

/// Startup configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` is set but is not a socket address.
    #[error("invalid LISTEN_ADDR {value:?}: {source}")]
    InvalidListenAddr {
        /// Raw value read from the environment.
        value: String,
        /// Underlying parse failure.
        source: std::net::AddrParseError,
    },

    /// `PONG_SCOPE` is neither `sender` nor `broadcast`.
    #[error("invalid PONG_SCOPE {0:?}: expected \"sender\" or \"broadcast\"")]
    InvalidEmitScope(String),
}

/// Decoding failures for inbound WebSocket frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The frame carried no bytes.
    #[error("empty frame")]
    Empty,

    /// The leading packet type character is not recognised.
    #[error("unknown packet type {0:?}")]
    UnknownPacketType(char),

    /// The JSON portion of the frame failed to parse.
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A Socket.IO packet header (attachments, namespace, ack id) is malformed.
    #[error("malformed packet header: {0}")]
    MalformedHeader(String),

    /// An event packet whose data is not `[name, ...args]`.
    #[error("event data must be an array starting with the event name")]
    MalformedEvent,
}

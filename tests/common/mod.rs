//! Shared helpers for integration tests: a server on an ephemeral port and
//! thin WebSocket client wrappers.

#![allow(dead_code, clippy::panic)]

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use pingpong_gateway::config::ServerConfig;
use pingpong_gateway::server::build_app;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Client-side WebSocket stream.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Upper bound on waiting for any single frame.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Starts the app for `config` on `127.0.0.1:0` and returns its address.
pub async fn spawn_server(config: ServerConfig) -> SocketAddr {
    let listener = assert_ok!(TcpListener::bind("127.0.0.1:0").await);
    let addr = assert_ok!(listener.local_addr());
    let app = build_app(&config);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Starts the app with the default configuration.
pub async fn spawn_default_server() -> SocketAddr {
    spawn_server(ServerConfig::default()).await
}

/// Opens a WebSocket to `path` on `addr`.
pub async fn connect(addr: SocketAddr, path: &str) -> WsClient {
    let url = format!("ws://{addr}{path}");
    let (ws, _response) = assert_ok!(connect_async(url).await);
    ws
}

/// Sends a text frame.
pub async fn send_text(ws: &mut WsClient, text: &str) {
    assert_ok!(ws.send(Message::text(text.to_owned())).await);
}

/// Waits for the next text frame, skipping control frames.
pub async fn next_text(ws: &mut WsClient) -> String {
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, ws.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => return text.as_str().to_owned(),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
            other => panic!("expected a text frame, got {other:?}"),
        }
    }
}

/// Asserts that no text frame arrives within `window`.
pub async fn assert_silent(ws: &mut WsClient, window: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = tokio::time::timeout(window, ws.next()).await {
        panic!("unexpected frame: {text}");
    }
}

/// Waits until the server closes the connection.
pub async fn wait_closed(ws: &mut WsClient) {
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, ws.next()).await {
            Ok(None | Some(Err(_)) | Some(Ok(Message::Close(_)))) => return,
            Ok(Some(Ok(_))) => {}
            Err(_) => panic!("connection still open after {RECV_TIMEOUT:?}"),
        }
    }
}

/// Sends a `ping` envelope on a `/ws` connection.
pub async fn send_ping_envelope(ws: &mut WsClient, data: Value) {
    let frame = serde_json::json!({ "event": "ping", "data": data }).to_string();
    send_text(ws, &frame).await;
}

/// Reads the next frame of a `/ws` connection as JSON.
pub async fn next_envelope(ws: &mut WsClient) -> Value {
    let text = next_text(ws).await;
    serde_json::from_str(&text).unwrap_or_else(|err| panic!("not json ({err}): {text}"))
}

/// Opens `/socket.io/`, reads the OPEN packet, and joins the default
/// namespace. Returns the client and the parsed OPEN payload.
pub async fn connect_socketio(addr: SocketAddr) -> (WsClient, Value) {
    let mut ws = connect(addr, "/socket.io/?EIO=4&transport=websocket").await;

    let open = next_text(&mut ws).await;
    let Some(json) = open.strip_prefix('0') else {
        panic!("expected OPEN packet, got {open}");
    };
    let handshake: Value =
        serde_json::from_str(json).unwrap_or_else(|err| panic!("bad OPEN payload ({err}): {json}"));

    send_text(&mut ws, "40").await;
    let connected = next_text(&mut ws).await;
    assert!(connected.starts_with(r#"40{"sid":""#), "{connected}");

    (ws, handshake)
}

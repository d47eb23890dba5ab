//! WebSocket connection loop.
//!
//! Handles the read/write loop for a single WebSocket connection: inbound
//! frames go through the [`Transport`], replies are written back before the
//! next frame is read, and broadcast events from the [`EventBus`] are
//! forwarded to the peer.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use tokio::time::{Instant, MissedTickBehavior};

use super::transport::{Heartbeat, Outbound, Transport};
use crate::app_state::AppState;
use crate::domain::EventBus;

/// Tick period used when the transport has no heartbeat. The tick branch is
/// disabled in that case, the interval only has to exist.
const IDLE_PERIOD: Duration = Duration::from_secs(3600);

type WsSink = SplitSink<WebSocket, Message>;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Sends the transport's opening frames.
/// - Reads frames from the client and writes the replies in order.
/// - Forwards events from the [`EventBus`] to the client.
/// - Drives the transport heartbeat, if it has one.
pub async fn run_connection<T: Transport>(socket: WebSocket, mut transport: T, state: AppState) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut event_rx = state.event_bus.subscribe();
    let max_payload = state.transport.max_payload_bytes;
    let protocol = transport.name();

    tracing::debug!(
        protocol,
        connections = state.event_bus.receiver_count(),
        "ws connection opened"
    );

    for frame in transport.open() {
        if ws_tx.send(Message::text(frame)).await.is_err() {
            return;
        }
    }

    let heartbeat_period = transport.heartbeat_period();
    let period = heartbeat_period
        .unwrap_or(IDLE_PERIOD)
        .max(Duration::from_millis(1));
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if text.len() > max_payload {
                            tracing::debug!(protocol, len = text.len(), max_payload, "dropping oversized frame");
                            continue;
                        }
                        let outbound = transport.on_text(&text, &state.router);
                        if !deliver(&mut ws_tx, &state.event_bus, outbound).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(protocol, error = %err, "ws read failed");
                        break;
                    }
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(event) => {
                        if let Some(frame) = transport.encode_broadcast(&event)
                            && ws_tx.send(Message::text(frame)).await.is_err() {
                                break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(protocol, lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            // Transport heartbeat
            _ = heartbeat.tick(), if heartbeat_period.is_some() => {
                match transport.on_heartbeat(std::time::Instant::now()) {
                    Heartbeat::Idle => {}
                    Heartbeat::Send(frame) => {
                        if ws_tx.send(Message::text(frame)).await.is_err() {
                            break;
                        }
                    }
                    Heartbeat::Expired => {
                        tracing::warn!(protocol, "heartbeat timed out, closing connection");
                        break;
                    }
                }
            }
        }
    }

    let _ = ws_tx.close().await;
    tracing::debug!(protocol, "ws connection closed");
}

/// Carries out the transport's reactions to one inbound frame, in order.
///
/// Returns `false` when the connection must end.
async fn deliver(ws_tx: &mut WsSink, event_bus: &EventBus, outbound: Vec<Outbound>) -> bool {
    for item in outbound {
        match item {
            Outbound::Frame(frame) => {
                if ws_tx.send(Message::text(frame)).await.is_err() {
                    return false;
                }
            }
            Outbound::Publish(event) => {
                let receivers = event_bus.publish(event);
                tracing::trace!(receivers, "event broadcast");
            }
            Outbound::Close => return false,
        }
    }
    true
}

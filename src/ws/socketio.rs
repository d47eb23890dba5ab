//! Socket.IO session state for one `/socket.io/` connection.
//!
//! The session answers the Engine.IO handshake, lets the client join the
//! default namespace, routes EVENT packets, and runs the server-driven
//! heartbeat. Other namespaces are refused with CONNECT_ERROR.

use std::time::{Duration, Instant};

use super::engineio::{
    DEFAULT_NAMESPACE, EnginePacket, OpenHandshake, SocketPacket, SocketPacketKind,
};
use super::transport::{Heartbeat, Outbound, Transport};
use crate::config::TransportSettings;
use crate::domain::{Event, EventRouter};
use crate::error::FrameError;

/// Per-connection Socket.IO state.
#[derive(Debug)]
pub struct SocketIoSession {
    engine_sid: String,
    settings: TransportSettings,
    /// Socket id handed out when the client joined `/`.
    socket_sid: Option<String>,
    /// When the unanswered heartbeat ping was sent.
    ping_sent_at: Option<Instant>,
}

impl SocketIoSession {
    /// Creates a session with a fresh Engine.IO session id.
    #[must_use]
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            engine_sid: new_sid(),
            settings,
            socket_sid: None,
            ping_sent_at: None,
        }
    }

    /// Returns the Engine.IO session id.
    #[must_use]
    pub fn sid(&self) -> &str {
        &self.engine_sid
    }

    /// Returns `true` once the client joined the default namespace.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.socket_sid.is_some()
    }

    fn handshake(&self) -> OpenHandshake {
        OpenHandshake {
            sid: self.engine_sid.clone(),
            upgrades: Vec::new(),
            ping_interval: as_millis(self.settings.ping_interval),
            ping_timeout: as_millis(self.settings.ping_timeout),
            max_payload: self.settings.max_payload_bytes,
        }
    }

    fn on_message(&mut self, payload: &str, router: &EventRouter) -> Result<Vec<Outbound>, FrameError> {
        let packet = SocketPacket::decode(payload)?;
        match packet.kind {
            SocketPacketKind::Connect => Ok(vec![Outbound::Frame(self.on_connect(&packet.namespace))]),
            SocketPacketKind::Disconnect => {
                if packet.namespace == DEFAULT_NAMESPACE {
                    tracing::debug!(sid = %self.engine_sid, "client left namespace");
                    self.socket_sid = None;
                }
                Ok(Vec::new())
            }
            SocketPacketKind::Event => self.on_event(&packet, router),
            SocketPacketKind::BinaryEvent | SocketPacketKind::BinaryAck => {
                tracing::debug!(sid = %self.engine_sid, "binary packets are not supported");
                Ok(Vec::new())
            }
            SocketPacketKind::Ack | SocketPacketKind::ConnectError => Ok(Vec::new()),
        }
    }

    fn on_connect(&mut self, namespace: &str) -> String {
        if namespace != DEFAULT_NAMESPACE {
            tracing::debug!(sid = %self.engine_sid, namespace, "refusing unknown namespace");
            return SocketPacket::connect_error(namespace, "Invalid namespace").to_frame();
        }
        let sid = self.socket_sid.get_or_insert_with(new_sid);
        tracing::debug!(sid = %self.engine_sid, socket = %sid, "client joined namespace");
        SocketPacket::connect(namespace, sid).to_frame()
    }

    fn on_event(&self, packet: &SocketPacket, router: &EventRouter) -> Result<Vec<Outbound>, FrameError> {
        if packet.namespace != DEFAULT_NAMESPACE || !self.is_connected() {
            tracing::debug!(
                sid = %self.engine_sid,
                namespace = %packet.namespace,
                "event on a namespace the client has not joined"
            );
            return Ok(Vec::new());
        }

        let event = packet.to_event()?;
        let namespace = packet.namespace.as_str();
        let Some(emit) = router.dispatch(&event) else {
            return Ok(Vec::new());
        };
        let mut out: Vec<Outbound> =
            Outbound::from_emit(emit, |reply| Some(SocketPacket::event(namespace, reply).to_frame()))
                .into_iter()
                .collect();
        if let Some(id) = packet.ack_id {
            out.push(Outbound::Frame(SocketPacket::ack(namespace, id).to_frame()));
        }
        Ok(out)
    }
}

impl Transport for SocketIoSession {
    fn name(&self) -> &'static str {
        "socketio"
    }

    fn open(&mut self) -> Vec<String> {
        vec![self.handshake().to_frame()]
    }

    fn on_text(&mut self, text: &str, router: &EventRouter) -> Vec<Outbound> {
        let result = match EnginePacket::decode(text) {
            Ok(EnginePacket::Close) => Ok(vec![Outbound::Close]),
            Ok(EnginePacket::Ping(payload)) => {
                Ok(vec![Outbound::Frame(EnginePacket::Pong(payload).encode())])
            }
            Ok(EnginePacket::Pong(_)) => {
                self.ping_sent_at = None;
                Ok(Vec::new())
            }
            Ok(EnginePacket::Message(payload)) => self.on_message(payload, router),
            Ok(EnginePacket::Open(_) | EnginePacket::Upgrade | EnginePacket::Noop) => Ok(Vec::new()),
            Err(err) => Err(err),
        };

        result.unwrap_or_else(|err| {
            tracing::debug!(sid = %self.engine_sid, error = %err, "dropping undecodable packet");
            Vec::new()
        })
    }

    fn encode_broadcast(&self, event: &Event) -> Option<String> {
        self.is_connected()
            .then(|| SocketPacket::event(DEFAULT_NAMESPACE, event).to_frame())
    }

    fn heartbeat_period(&self) -> Option<Duration> {
        Some(self.settings.ping_interval)
    }

    fn on_heartbeat(&mut self, now: Instant) -> Heartbeat {
        match self.ping_sent_at {
            Some(sent) if now.saturating_duration_since(sent) >= self.settings.ping_timeout => {
                Heartbeat::Expired
            }
            Some(_) => Heartbeat::Idle,
            None => {
                self.ping_sent_at = Some(now);
                Heartbeat::Send(EnginePacket::Ping("").encode())
            }
        }
    }
}

fn new_sid() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn as_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

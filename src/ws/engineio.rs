//! Engine.IO v4 and Socket.IO v5 text packet codecs.
//!
//! Only what a websocket-only client exchanges is covered: no long-polling
//! payload batching and no binary attachments.
//!
//! ```text
//! engine packet : <type digit><payload>
//! socket packet : <type digit>[<attachments>-][<nsp>,][<ack id>][<json>]
//! ```

use serde::Serialize;
use serde_json::Value;

use super::lossy::from_str_lossy;
use crate::domain::Event;
use crate::error::FrameError;

/// Engine.IO protocol revision spoken by this server.
pub const PROTOCOL_VERSION: &str = "4";

/// Socket.IO namespace every client may join.
pub const DEFAULT_NAMESPACE: &str = "/";

/// Engine.IO packet, borrowing its payload from the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePacket<'a> {
    /// `0`: handshake, only ever sent by the server.
    Open(&'a str),
    /// `1`: transport close.
    Close,
    /// `2`: heartbeat ping, with optional payload.
    Ping(&'a str),
    /// `3`: heartbeat answer, with optional payload.
    Pong(&'a str),
    /// `4`: a Socket.IO packet.
    Message(&'a str),
    /// `5`: transport upgrade.
    Upgrade,
    /// `6`: no-op.
    Noop,
}

impl<'a> EnginePacket<'a> {
    /// Decodes one text frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] for an empty frame or an unknown type digit.
    pub fn decode(frame: &'a str) -> Result<Self, FrameError> {
        let mut chars = frame.chars();
        let kind = chars.next().ok_or(FrameError::Empty)?;
        let rest = chars.as_str();
        match kind {
            '0' => Ok(Self::Open(rest)),
            '1' => Ok(Self::Close),
            '2' => Ok(Self::Ping(rest)),
            '3' => Ok(Self::Pong(rest)),
            '4' => Ok(Self::Message(rest)),
            '5' => Ok(Self::Upgrade),
            '6' => Ok(Self::Noop),
            other => Err(FrameError::UnknownPacketType(other)),
        }
    }

    /// Encodes this packet as a text frame.
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Open(payload) => format!("0{payload}"),
            Self::Close => "1".to_string(),
            Self::Ping(payload) => format!("2{payload}"),
            Self::Pong(payload) => format!("3{payload}"),
            Self::Message(payload) => format!("4{payload}"),
            Self::Upgrade => "5".to_string(),
            Self::Noop => "6".to_string(),
        }
    }
}

/// Payload of the Engine.IO OPEN packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenHandshake {
    /// Engine.IO session id.
    pub sid: String,
    /// Transports the client may upgrade to. Always empty: websocket only.
    pub upgrades: Vec<String>,
    /// Milliseconds between server pings.
    pub ping_interval: u64,
    /// Milliseconds the client has to answer a ping.
    pub ping_timeout: u64,
    /// Largest accepted frame, in bytes.
    pub max_payload: usize,
}

impl OpenHandshake {
    /// Encodes the handshake as a complete OPEN frame.
    #[must_use]
    pub fn to_frame(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string());
        EnginePacket::Open(&json).encode()
    }
}

/// Socket.IO packet type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketPacketKind {
    /// `0`: join a namespace.
    Connect,
    /// `1`: leave a namespace.
    Disconnect,
    /// `2`: named event.
    Event,
    /// `3`: acknowledgement of an event.
    Ack,
    /// `4`: namespace join refused.
    ConnectError,
    /// `5`: event with binary attachments.
    BinaryEvent,
    /// `6`: acknowledgement with binary attachments.
    BinaryAck,
}

impl SocketPacketKind {
    const fn from_digit(c: char) -> Option<Self> {
        match c {
            '0' => Some(Self::Connect),
            '1' => Some(Self::Disconnect),
            '2' => Some(Self::Event),
            '3' => Some(Self::Ack),
            '4' => Some(Self::ConnectError),
            '5' => Some(Self::BinaryEvent),
            '6' => Some(Self::BinaryAck),
            _ => None,
        }
    }

    const fn digit(self) -> char {
        match self {
            Self::Connect => '0',
            Self::Disconnect => '1',
            Self::Event => '2',
            Self::Ack => '3',
            Self::ConnectError => '4',
            Self::BinaryEvent => '5',
            Self::BinaryAck => '6',
        }
    }

    const fn is_binary(self) -> bool {
        matches!(self, Self::BinaryEvent | Self::BinaryAck)
    }
}

/// A decoded Socket.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketPacket {
    /// Packet type.
    pub kind: SocketPacketKind,
    /// Target namespace, `/` when the header omits it.
    pub namespace: String,
    /// Acknowledgement id requested by the sender.
    pub ack_id: Option<u64>,
    /// JSON body, if any.
    pub data: Option<Value>,
}

impl SocketPacket {
    /// Builds a CONNECT answer carrying the socket id.
    #[must_use]
    pub fn connect(namespace: &str, sid: &str) -> Self {
        Self {
            kind: SocketPacketKind::Connect,
            namespace: namespace.to_string(),
            ack_id: None,
            data: Some(serde_json::json!({ "sid": sid })),
        }
    }

    /// Builds a CONNECT_ERROR with a human-readable reason.
    #[must_use]
    pub fn connect_error(namespace: &str, message: &str) -> Self {
        Self {
            kind: SocketPacketKind::ConnectError,
            namespace: namespace.to_string(),
            ack_id: None,
            data: Some(serde_json::json!({ "message": message })),
        }
    }

    /// Builds an EVENT carrying `event` as `[name, data]`.
    #[must_use]
    pub fn event(namespace: &str, event: &Event) -> Self {
        Self {
            kind: SocketPacketKind::Event,
            namespace: namespace.to_string(),
            ack_id: None,
            data: Some(Value::Array(vec![
                Value::String(event.name.clone()),
                event.data.clone(),
            ])),
        }
    }

    /// Builds an ACK with no arguments.
    #[must_use]
    pub fn ack(namespace: &str, id: u64) -> Self {
        Self {
            kind: SocketPacketKind::Ack,
            namespace: namespace.to_string(),
            ack_id: Some(id),
            data: Some(Value::Array(Vec::new())),
        }
    }

    /// Decodes the payload of an Engine.IO MESSAGE packet.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError`] for an unknown type digit, a malformed header,
    /// or a JSON body that does not parse.
    pub fn decode(payload: &str) -> Result<Self, FrameError> {
        let mut chars = payload.chars();
        let digit = chars.next().ok_or(FrameError::Empty)?;
        let kind = SocketPacketKind::from_digit(digit).ok_or(FrameError::UnknownPacketType(digit))?;
        let mut rest = chars.as_str();

        if kind.is_binary() {
            let Some((count, tail)) = rest.split_once('-') else {
                return Err(FrameError::MalformedHeader(
                    "binary packet without attachment count".to_string(),
                ));
            };
            if count.is_empty() || !count.bytes().all(|b| b.is_ascii_digit()) {
                return Err(FrameError::MalformedHeader(format!(
                    "invalid attachment count {count:?}"
                )));
            }
            rest = tail;
        }

        let namespace = if rest.starts_with('/') {
            match rest.split_once(',') {
                Some((nsp, tail)) => {
                    rest = tail;
                    nsp.to_string()
                }
                None => {
                    let nsp = rest.to_string();
                    rest = "";
                    nsp
                }
            }
        } else {
            DEFAULT_NAMESPACE.to_string()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let (id, body) = rest.split_at(digits);
        let ack_id = if id.is_empty() {
            None
        } else {
            Some(
                id.parse()
                    .map_err(|_| FrameError::MalformedHeader(format!("invalid ack id {id:?}")))?,
            )
        };

        let data = if body.is_empty() {
            None
        } else {
            Some(from_str_lossy(body)?)
        };

        Ok(Self {
            kind,
            namespace,
            ack_id,
            data,
        })
    }

    /// Encodes this packet as a Socket.IO payload, without the Engine.IO
    /// MESSAGE prefix.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push(self.kind.digit());
        if self.namespace != DEFAULT_NAMESPACE {
            out.push_str(&self.namespace);
            out.push(',');
        }
        if let Some(id) = self.ack_id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = &self.data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// Encodes this packet as a complete Engine.IO MESSAGE frame.
    #[must_use]
    pub fn to_frame(&self) -> String {
        EnginePacket::Message(&self.encode()).encode()
    }

    /// Interprets an EVENT body `[name, arg, ...]` as an [`Event`].
    ///
    /// Only the first argument is kept as the payload; a missing argument
    /// becomes `null`.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::MalformedEvent`] when the body is not an array
    /// whose first element is a string.
    pub fn to_event(&self) -> Result<Event, FrameError> {
        let Some(Value::Array(items)) = &self.data else {
            return Err(FrameError::MalformedEvent);
        };
        let mut items = items.iter();
        let Some(Value::String(name)) = items.next() else {
            return Err(FrameError::MalformedEvent);
        };
        let data = items.next().cloned().unwrap_or(Value::Null);
        Ok(Event::new(name.clone(), data))
    }
}

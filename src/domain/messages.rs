//! Echo payloads: `ping` in, `pong` out.

use serde::Serialize;
use serde_json::Value;

use super::Event;

/// Name of the inbound echo request event.
pub const PING_EVENT: &str = "ping";

/// Name of the outbound echo reply event.
pub const PONG_EVENT: &str = "pong";

/// Payload of a `ping` event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PingMessage {
    /// Text to echo. Absent on the wire means empty.
    pub msg: String,
}

impl PingMessage {
    /// Extracts a ping from an untrusted payload.
    ///
    /// Never fails: a payload that is not an object, has no `msg` key, or
    /// whose `msg` is not a string yields an empty message.
    #[must_use]
    pub fn from_payload(payload: &Value) -> Self {
        let msg = payload
            .get("msg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_owned();
        Self { msg }
    }
}

/// Payload of a `pong` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PongMessage {
    /// Echoed text.
    pub msg: String,
}

impl From<PingMessage> for PongMessage {
    fn from(ping: PingMessage) -> Self {
        Self { msg: ping.msg }
    }
}

impl PongMessage {
    /// Wraps this payload in a `pong` [`Event`].
    #[must_use]
    pub fn into_event(self) -> Event {
        let data = serde_json::to_value(&self).unwrap_or_default();
        Event::new(PONG_EVENT, data)
    }
}

/// Handler registered for [`PING_EVENT`]: echoes `msg` back as a `pong`.
#[must_use]
pub fn handle_ping(data: &Value) -> Event {
    let ping = PingMessage::from_payload(data);
    tracing::trace!(len = ping.msg.len(), "ping received");
    PongMessage::from(ping).into_event()
}

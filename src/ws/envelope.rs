//! Plain JSON envelope framing for `/ws`.
//!
//! Each text frame is one `{"event": <name>, "data": <payload>}` object.
//! Lone surrogate escapes in strings decode as U+FFFD. Frames that still
//! do not decode are dropped; the peer never sees an error.

use serde::{Deserialize, Serialize};

use super::lossy::from_str_lossy;
use super::transport::{Outbound, Transport};
use crate::domain::{Event, EventRouter};

/// Wire shape of one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Event name.
    pub event: String,
    /// Event payload. Defaults to `null` when omitted.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl From<Envelope> for Event {
    fn from(envelope: Envelope) -> Self {
        Self::new(envelope.event, envelope.data)
    }
}

impl From<&Event> for Envelope {
    fn from(event: &Event) -> Self {
        Self {
            event: event.name.clone(),
            data: event.data.clone(),
        }
    }
}

/// Encodes `event` as an envelope frame.
#[must_use]
pub fn encode(event: &Event) -> Option<String> {
    serde_json::to_string(&Envelope::from(event))
        .inspect_err(|err| tracing::warn!(error = %err, "failed to encode envelope"))
        .ok()
}

/// Stateless [`Transport`] for JSON envelopes.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvelopeTransport;

impl EnvelopeTransport {
    /// Creates a new envelope transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Transport for EnvelopeTransport {
    fn name(&self) -> &'static str {
        "envelope"
    }

    fn on_text(&mut self, text: &str, router: &EventRouter) -> Vec<Outbound> {
        let envelope = match from_str_lossy::<Envelope>(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(error = %err, "dropping undecodable envelope");
                return Vec::new();
            }
        };

        router
            .dispatch(&Event::from(envelope))
            .and_then(|emit| Outbound::from_emit(emit, encode))
            .into_iter()
            .collect()
    }

    fn encode_broadcast(&self, event: &Event) -> Option<String> {
        encode(event)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::domain::EmitScope;

    fn router(scope: EmitScope) -> EventRouter {
        EventRouter::with_default_routes(scope)
    }

    fn single_frame(out: Vec<Outbound>) -> Value {
        let [Outbound::Frame(frame)] = out.as_slice() else {
            panic!("expected exactly one frame, got {out:?}");
        };
        serde_json::from_str(frame).unwrap_or_else(|_| panic!("frame is not json: {frame}"))
    }

    #[test]
    fn ping_is_answered_with_pong() {
        let mut transport = EnvelopeTransport::new();
        let out = transport.on_text(
            r#"{"event":"ping","data":{"msg":"hello"}}"#,
            &router(EmitScope::Sender),
        );
        assert_eq!(
            single_frame(out),
            json!({ "event": "pong", "data": { "msg": "hello" } })
        );
    }

    #[test]
    fn empty_and_missing_payloads_echo_empty() {
        let mut transport = EnvelopeTransport::new();
        let router = router(EmitScope::Sender);
        for frame in [
            r#"{"event":"ping","data":{}}"#,
            r#"{"event":"ping","data":{"msg":""}}"#,
            r#"{"event":"ping"}"#,
            r#"{"event":"ping","data":"not an object"}"#,
        ] {
            assert_eq!(
                single_frame(transport.on_text(frame, &router)),
                json!({ "event": "pong", "data": { "msg": "" } }),
                "{frame}"
            );
        }
    }

    #[test]
    fn garbage_is_dropped() {
        let mut transport = EnvelopeTransport::new();
        let router = router(EmitScope::Sender);
        for frame in ["", "not json", "[]", r#"{"data":{}}"#, r#"{"event":5}"#] {
            assert!(transport.on_text(frame, &router).is_empty(), "{frame}");
        }
    }

    #[test]
    fn lone_surrogate_is_echoed_as_replacement_character() {
        let mut transport = EnvelopeTransport::new();
        let out = transport.on_text(
            r#"{"event":"ping","data":{"msg":"a\ud800b"}}"#,
            &router(EmitScope::Sender),
        );
        assert_eq!(
            single_frame(out),
            json!({ "event": "pong", "data": { "msg": "a\u{FFFD}b" } })
        );
    }

    #[test]
    fn unknown_events_are_dropped() {
        let mut transport = EnvelopeTransport::new();
        let out = transport.on_text(r#"{"event":"chat","data":{}}"#, &router(EmitScope::Sender));
        assert!(out.is_empty());
    }

    #[test]
    fn broadcast_scope_publishes() {
        let mut transport = EnvelopeTransport::new();
        let out = transport.on_text(
            r#"{"event":"ping","data":{"msg":"all"}}"#,
            &router(EmitScope::Broadcast),
        );
        assert_eq!(
            out,
            vec![Outbound::Publish(Event::new("pong", json!({ "msg": "all" })))]
        );
    }

    #[test]
    fn broadcast_events_encode_as_envelopes() {
        let transport = EnvelopeTransport::new();
        let Some(frame) = transport.encode_broadcast(&Event::new("pong", json!({ "msg": "x" })))
        else {
            panic!("encoding failed");
        };
        let value: Value = serde_json::from_str(&frame).unwrap_or_default();
        assert_eq!(value, json!({ "event": "pong", "data": { "msg": "x" } }));
    }
}

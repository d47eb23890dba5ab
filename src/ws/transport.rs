//! The seam between the connection loop and a wire framing.

use std::time::{Duration, Instant};

use crate::domain::{Emit, EmitScope, Event, EventRouter};

/// Something the connection loop must do after a frame was handled.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// Write this text frame back to the peer.
    Frame(String),
    /// Publish this event on the bus for every connection.
    Publish(Event),
    /// Close the connection.
    Close,
}

impl Outbound {
    /// Turns a routed reply into the action its scope calls for, encoding
    /// sender-scoped events with `encode`.
    pub fn from_emit<F>(emit: Emit, encode: F) -> Option<Self>
    where
        F: FnOnce(&Event) -> Option<String>,
    {
        match emit.scope {
            EmitScope::Sender => encode(&emit.event).map(Self::Frame),
            EmitScope::Broadcast => Some(Self::Publish(emit.event)),
        }
    }
}

/// Result of a heartbeat tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heartbeat {
    /// Nothing to do this tick.
    Idle,
    /// Send this frame to check the peer is alive.
    Send(String),
    /// The peer missed its deadline; drop the connection.
    Expired,
}

/// A wire framing driven by [`super::connection::run_connection`].
///
/// Implementations own all per-connection protocol state. Methods are
/// synchronous: the loop performs the I/O.
pub trait Transport: Send + 'static {
    /// Short name used in log fields.
    fn name(&self) -> &'static str;

    /// Frames sent right after the upgrade completes.
    fn open(&mut self) -> Vec<String> {
        Vec::new()
    }

    /// Handles one inbound text frame.
    fn on_text(&mut self, text: &str, router: &EventRouter) -> Vec<Outbound>;

    /// Encodes an event received from the bus, or `None` to skip it.
    fn encode_broadcast(&self, event: &Event) -> Option<String>;

    /// Period of [`Transport::on_heartbeat`] ticks, `None` to disable them.
    fn heartbeat_period(&self) -> Option<Duration> {
        None
    }

    /// Called every [`Transport::heartbeat_period`].
    fn on_heartbeat(&mut self, _now: Instant) -> Heartbeat {
        Heartbeat::Idle
    }
}

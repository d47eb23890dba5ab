//! Static event-name to handler routing table.
//!
//! The table is built once at startup and shared read-only by every
//! connection. Handlers are plain function pointers: they hold no state and
//! never block, so dispatch needs no locking.

use std::collections::HashMap;

use serde_json::Value;

use super::messages::{PING_EVENT, handle_ping};
use super::{Emit, EmitScope, Event};

/// Signature of an event handler: inbound payload to reply event.
pub type EventHandler = fn(&Value) -> Event;

/// Maps event names to handlers and stamps replies with an [`EmitScope`].
#[derive(Debug, Clone)]
pub struct EventRouter {
    handlers: HashMap<String, EventHandler>,
    scope: EmitScope,
}

impl EventRouter {
    /// Creates an empty router whose replies use `scope`.
    #[must_use]
    pub fn new(scope: EmitScope) -> Self {
        Self {
            handlers: HashMap::new(),
            scope,
        }
    }

    /// Creates a router with the `ping` handler registered.
    #[must_use]
    pub fn with_default_routes(scope: EmitScope) -> Self {
        let mut router = Self::new(scope);
        router.register(PING_EVENT, handle_ping);
        router
    }

    /// Registers `handler` for `name`.
    ///
    /// A name maps to exactly one handler: registering it again replaces the
    /// previous handler, which is returned.
    pub fn register(&mut self, name: impl Into<String>, handler: EventHandler) -> Option<EventHandler> {
        let name = name.into();
        let replaced = self.handlers.insert(name.clone(), handler);
        if replaced.is_some() {
            tracing::debug!(event = %name, "event handler replaced");
        }
        replaced
    }

    /// Runs the handler registered for `event.name`.
    ///
    /// Returns `None` for events without a handler.
    #[must_use]
    pub fn dispatch(&self, event: &Event) -> Option<Emit> {
        let Some(handler) = self.handlers.get(&event.name) else {
            tracing::debug!(event = %event.name, "no handler for event");
            return None;
        };
        Some(Emit {
            scope: self.scope,
            event: handler(&event.data),
        })
    }
}

//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::{ServerConfig, TransportSettings};
use crate::domain::{EventBus, EventRouter};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Static event routing table, built once at startup.
    pub router: Arc<EventRouter>,
    /// Event bus for broadcast-scoped emits.
    pub event_bus: EventBus,
    /// Per-connection limits and heartbeat timers.
    pub transport: TransportSettings,
}

impl AppState {
    /// Builds the state for `config` with the default event routes.
    #[must_use]
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            router: Arc::new(EventRouter::with_default_routes(config.pong_scope)),
            event_bus: EventBus::new(config.event_bus_capacity),
            transport: config.transport,
        }
    }
}

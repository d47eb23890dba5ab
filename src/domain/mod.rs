//! Domain layer: events, echo messages, routing, and broadcast.
//!
//! Nothing in here knows about WebSockets or wire framing. Transports turn
//! frames into [`Event`]s, hand them to the [`EventRouter`], and deliver the
//! resulting [`Emit`] either to the sender or through the [`EventBus`].

pub mod event;
pub mod event_bus;
pub mod event_router;
pub mod messages;

pub use event::{Emit, EmitScope, Event};
pub use event_bus::EventBus;
pub use event_router::{EventHandler, EventRouter};
pub use messages::{PING_EVENT, PONG_EVENT, PingMessage, PongMessage};

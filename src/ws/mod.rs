//! WebSocket layer: upgrade handlers, connection loop, and wire framings.
//!
//! Two endpoints share one connection loop and differ only in framing:
//!
//! - `/ws` carries plain JSON envelopes (`{"event": .., "data": ..}`).
//! - `/socket.io/` speaks Engine.IO v4 / Socket.IO v5 text packets so that
//!   `socket.io-client` can connect with the websocket transport.

pub mod connection;
pub mod engineio;
pub mod envelope;
pub mod handler;
pub mod lossy;
pub mod socketio;
pub mod transport;

pub use envelope::EnvelopeTransport;
pub use socketio::SocketIoSession;
pub use transport::{Heartbeat, Outbound, Transport};

//! # pingpong-gateway
//!
//! A minimal real-time echo service. Clients open a WebSocket, send a
//! `ping` event carrying `{"msg": ...}`, and get a `pong` event with the
//! same `msg` back. `GET /` answers `{"message": "Backend is alive"}` for
//! liveness checks.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── Health route (api/)
//!     ├── /ws        JSON envelopes ──┐
//!     ├── /socket.io Engine.IO v4 ────┤ ws/ (Transport + connection loop)
//!     │                               │
//!     ├── EventRouter (domain/) ◄─────┘
//!     └── EventBus (domain/)    broadcast-scoped replies
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod ws;

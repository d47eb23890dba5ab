//! Server configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). Every key has a default, so an empty
//! environment yields a server listening on `0.0.0.0:8000` that replies to
//! the sender only.

use std::net::SocketAddr;
use std::time::Duration;

use crate::domain::EmitScope;
use crate::error::ConfigError;

/// Default bind address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

/// Top-level server configuration.
///
/// Loaded once at startup via [`ServerConfig::from_env`].
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind the HTTP server to.
    pub listen_addr: SocketAddr,

    /// Where `pong` replies are delivered.
    pub pong_scope: EmitScope,

    /// Capacity of the [`crate::domain::EventBus`] broadcast channel.
    pub event_bus_capacity: usize,

    /// Transport-level limits shared by every WebSocket connection.
    pub transport: TransportSettings,

    /// Upper bound on the time spent producing an HTTP response.
    pub http_timeout: Duration,

    /// Output format of the tracing subscriber.
    pub log_format: LogFormat,
}

/// Limits and timers applied to every WebSocket connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    /// Interval between Engine.IO heartbeat pings sent by the server.
    pub ping_interval: Duration,

    /// Grace period a Socket.IO client has to answer a heartbeat ping.
    pub ping_timeout: Duration,

    /// Largest inbound text frame, in bytes. Larger frames are dropped.
    pub max_payload_bytes: usize,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_millis(25_000),
            ping_timeout: Duration::from_millis(20_000),
            max_payload_bytes: 1_000_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8000)),
            pong_scope: EmitScope::default(),
            event_bus_capacity: 1024,
            transport: TransportSettings::default(),
            http_timeout: Duration::from_secs(30),
            log_format: LogFormat::default(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file,
    /// then delegates to [`ServerConfig::from_lookup`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LISTEN_ADDR` or `PONG_SCOPE` is set to a
    /// value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Numeric keys that are missing or unparsable fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `LISTEN_ADDR` or `PONG_SCOPE` is set to a
    /// value that cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let raw_addr = lookup("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = raw_addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidListenAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let pong_scope = match lookup("PONG_SCOPE") {
            Some(raw) => raw.parse::<EmitScope>()?,
            None => defaults.pong_scope,
        };

        let transport = TransportSettings {
            ping_interval: Duration::from_millis(parse_key(
                &lookup,
                "SOCKETIO_PING_INTERVAL_MS",
                millis(defaults.transport.ping_interval),
            )),
            ping_timeout: Duration::from_millis(parse_key(
                &lookup,
                "SOCKETIO_PING_TIMEOUT_MS",
                millis(defaults.transport.ping_timeout),
            )),
            max_payload_bytes: parse_key(
                &lookup,
                "MAX_PAYLOAD_BYTES",
                defaults.transport.max_payload_bytes,
            ),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            listen_addr,
            pong_scope,
            event_bus_capacity: parse_key(
                &lookup,
                "EVENT_BUS_CAPACITY",
                defaults.event_bus_capacity,
            )
            .max(1),
            transport,
            http_timeout: Duration::from_secs(parse_key(
                &lookup,
                "HTTP_TIMEOUT_SECS",
                defaults.http_timeout.as_secs(),
            )),
            log_format,
        })
    }
}

/// Parses `key` as `T`, returning `default` on missing or invalid values.
fn parse_key<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

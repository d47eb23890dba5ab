//! Named events and their delivery scope.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// A named, payload-carrying message exchanged over a persistent connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Event name, e.g. `"ping"`.
    pub name: String,
    /// Arbitrary JSON payload. `Null` when the peer sent none.
    pub data: serde_json::Value,
}

impl Event {
    /// Creates a new event.
    #[must_use]
    pub fn new(name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Which peers an emitted event is delivered to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EmitScope {
    /// Only the connection that sent the triggering event.
    #[default]
    Sender,
    /// Every connected client, the sender included.
    Broadcast,
}

impl FromStr for EmitScope {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sender" => Ok(Self::Sender),
            "broadcast" => Ok(Self::Broadcast),
            _ => Err(ConfigError::InvalidEmitScope(s.to_string())),
        }
    }
}

impl fmt::Display for EmitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sender => f.write_str("sender"),
            Self::Broadcast => f.write_str("broadcast"),
        }
    }
}

/// An outbound event paired with the scope it must be delivered to.
#[derive(Debug, Clone, PartialEq)]
pub struct Emit {
    /// Delivery scope.
    pub scope: EmitScope,
    /// Event to deliver.
    pub event: Event,
}

//! Presence event and transport event types.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Event names emitted by the presence server.
pub mod events {
    pub const USER_JOIN: &str = "user-join";
    pub const USER_LEAVE: &str = "user-leave";
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A participant entered or left the joined room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresenceEvent {
    Joined { peer_id: String },
    Left { peer_id: String },
}

impl PresenceEvent {
    pub fn peer_id(&self) -> &str {
        match self {
            Self::Joined { peer_id } | Self::Left { peer_id } => peer_id,
        }
    }
}

/// Everything a presence transport reports to its subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Connected,
    Disconnected,
    Presence(PresenceEvent),
    Error(String),
}

//! Call session records and orchestrator commands.

use huddle_common::{CallDirection, CallState, RoomError};
use serde::Serialize;

use crate::media::MediaStream;
use crate::negotiation::IncomingCall;

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

/// The local record of a negotiation with one remote participant.
///
/// Absent peers have no record; a closed session is dropped immediately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallSession {
    pub peer_id: String,
    pub direction: CallDirection,
    pub state: CallState,
    /// Distinguishes successive sessions with the same peer.
    pub session_id: u64,
}

impl CallSession {
    pub fn is_active(&self) -> bool {
        self.state == CallState::Active
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Everything the orchestrator loop reacts to, in delivery order.
#[derive(Debug)]
pub enum CallCommand {
    /// A participant entered the room: call them.
    PeerJoined(String),
    /// A participant left: tear down their session.
    PeerLeft(String),
    Incoming(IncomingCall),
    StreamArrived {
        peer_id: String,
        session_id: u64,
        stream: MediaStream,
    },
    NegotiationFailed {
        peer_id: String,
        session_id: u64,
        error: RoomError,
    },
}

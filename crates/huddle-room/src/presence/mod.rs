//! Presence: who entered or left the joined room.
//!
//! A [`PresenceTransport`] delivers [`TransportEvent`]s over a channel; the
//! [`PresenceChannel`] pump turns each participant event into a roster
//! refresh followed by a call orchestrator command.

mod channel;
mod connection;
mod frame;
mod transport;
mod types;

pub use channel::PresenceChannel;
pub use transport::{PresenceTransport, SocketIoTransport};
pub use types::{events, PresenceEvent, TransportEvent};

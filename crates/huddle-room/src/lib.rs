//! Peer-to-peer audio rooms.
//!
//! A [`Room`] joins or creates a room on the membership service, listens for
//! participants entering and leaving, and keeps one call per remote
//! participant whose audio is merged into a single output.
//!
//! Collaborators sit behind traits so the negotiation stack, capture device,
//! membership service and presence transport can be swapped:
//! [`RoomService`], [`PresenceTransport`], [`Negotiator`], [`MediaCapture`].

pub mod audio;
pub mod calls;
pub mod facade;
pub mod identity;
pub mod media;
pub mod negotiation;
pub mod notifier;
pub mod presence;
pub mod room_client;

#[cfg(test)]
mod test_support;

pub use audio::AudioSession;
pub use calls::{CallCommand, CallOrchestrator, CallSession};
pub use facade::{Room, SessionContext};
pub use identity::Identity;
pub use media::{AudioTrack, MediaCapture, MediaStream, MergedOutput, RemoteTrack};
pub use negotiation::{CallHandle, IncomingCall, Negotiator};
pub use notifier::Notifier;
pub use presence::{PresenceChannel, PresenceEvent, PresenceTransport, SocketIoTransport, TransportEvent};
pub use room_client::{HttpRoomService, RoomClient, RoomService};

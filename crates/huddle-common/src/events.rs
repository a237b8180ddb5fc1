use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::types::{CallState, Participant};

/// State changes published to the UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    MembershipChanged { room_id: String },
    RosterUpdated(Vec<Participant>),
    CallStateChanged { peer_id: String, state: CallState },
    LocalMuteChanged(bool),
    RemoteMuteChanged(bool),
    Notification(String),
    #[serde(other)]
    Unknown,
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Returns the number of subscribers that received the event.
    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

//! Pumps transport events into roster refreshes and orchestrator commands.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::calls::CallCommand;
use crate::notifier::Notifier;
use crate::room_client::RoomClient;

use super::types::{PresenceEvent, TransportEvent};

pub struct PresenceChannel {
    room: Arc<RoomClient>,
    calls: mpsc::Sender<CallCommand>,
    notifier: Notifier,
    /// Set after a disconnect or error; cleared by the next `Connected`.
    degraded: bool,
}

impl PresenceChannel {
    pub fn new(room: Arc<RoomClient>, calls: mpsc::Sender<CallCommand>, notifier: Notifier) -> Self {
        Self {
            room,
            calls,
            notifier,
            degraded: false,
        }
    }

    /// Consume `events` until the transport closes or the orchestrator is gone.
    pub async fn run(mut self, mut events: mpsc::Receiver<TransportEvent>) {
        while let Some(event) = events.recv().await {
            if !self.handle(event).await {
                debug!("Call orchestrator stopped; ending presence pump");
                return;
            }
        }
        debug!("Presence transport closed");
    }

    /// Returns `false` once the orchestrator queue is closed.
    pub(crate) async fn handle(&mut self, event: TransportEvent) -> bool {
        match event {
            TransportEvent::Connected => {
                if self.degraded {
                    info!("Presence connection restored");
                    // Events may have been missed while offline.
                    let _ = self.room.refresh_roster().await;
                }
                self.degraded = false;
                true
            }
            TransportEvent::Disconnected => {
                if !self.degraded {
                    warn!("Presence connection lost");
                    self.notifier.warning("Lost connection to the room server");
                }
                self.degraded = true;
                true
            }
            TransportEvent::Error(message) => {
                if !self.degraded {
                    warn!(error = %message, "Presence transport error");
                    self.notifier.warning(format!("Room server unreachable: {message}"));
                }
                self.degraded = true;
                true
            }
            TransportEvent::Presence(event) => self.on_presence(event).await,
        }
    }

    async fn on_presence(&self, event: PresenceEvent) -> bool {
        if event.peer_id() == self.room.identity().user_id {
            debug!("Ignoring presence event for own id");
            return true;
        }

        // Refresh failures are surfaced by the room client.
        let _ = self.room.refresh_roster().await;

        let command = match event {
            PresenceEvent::Joined { peer_id } => {
                info!(peer_id = %peer_id, "Participant joined");
                CallCommand::PeerJoined(peer_id)
            }
            PresenceEvent::Left { peer_id } => {
                info!(peer_id = %peer_id, "Participant left");
                CallCommand::PeerLeft(peer_id)
            }
        };
        self.calls.send(command).await.is_ok()
    }
}

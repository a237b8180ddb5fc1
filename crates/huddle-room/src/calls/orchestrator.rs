//! Call orchestrator: one session per remote peer, driven from a single
//! command queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use huddle_common::{CallDirection, CallState, Event, RoomError};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::AudioSession;
use crate::media::{MediaStream, MergedOutput};
use crate::negotiation::{CallHandle, IncomingCall, Negotiator};
use crate::notifier::Notifier;
use crate::room_client::RoomClient;

use super::types::{CallCommand, CallSession};

struct SessionEntry {
    session: CallSession,
    /// Task waiting for the remote stream; gone once the call is active.
    waiter: Option<JoinHandle<()>>,
}

impl SessionEntry {
    fn cancel(self) {
        if let Some(waiter) = self.waiter {
            waiter.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Call Orchestrator
// ---------------------------------------------------------------------------

/// Owns every call session and the merged remote output's track list.
pub struct CallOrchestrator {
    negotiator: Arc<dyn Negotiator>,
    audio: Arc<AudioSession>,
    room: Arc<RoomClient>,
    output: Arc<RwLock<MergedOutput>>,
    notifier: Notifier,
    sessions: RwLock<HashMap<String, SessionEntry>>,
    command_tx: mpsc::Sender<CallCommand>,
    next_session_id: AtomicU64,
}

impl CallOrchestrator {
    /// Returns the orchestrator and the receiving end of its command queue,
    /// to be handed to [`CallOrchestrator::run`].
    pub fn new(
        negotiator: Arc<dyn Negotiator>,
        audio: Arc<AudioSession>,
        room: Arc<RoomClient>,
        output: Arc<RwLock<MergedOutput>>,
        notifier: Notifier,
    ) -> (Arc<Self>, mpsc::Receiver<CallCommand>) {
        let (command_tx, command_rx) = mpsc::channel(256);
        let orchestrator = Arc::new(Self {
            negotiator,
            audio,
            room,
            output,
            notifier,
            sessions: RwLock::new(HashMap::new()),
            command_tx,
            next_session_id: AtomicU64::new(1),
        });
        (orchestrator, command_rx)
    }

    /// Sender for presence and inbound-call pumps.
    pub fn sender(&self) -> mpsc::Sender<CallCommand> {
        self.command_tx.clone()
    }

    /// Process commands one at a time, in delivery order.
    pub async fn run(self: Arc<Self>, mut commands: mpsc::Receiver<CallCommand>) {
        while let Some(command) = commands.recv().await {
            self.handle(command).await;
        }
        debug!("Call command queue closed");
    }

    pub async fn handle(&self, command: CallCommand) {
        match command {
            CallCommand::PeerJoined(peer_id) => self.call_peer(peer_id).await,
            CallCommand::PeerLeft(peer_id) => self.tear_down(&peer_id).await,
            CallCommand::Incoming(call) => self.answer(call).await,
            CallCommand::StreamArrived {
                peer_id,
                session_id,
                stream,
            } => self.stream_arrived(peer_id, session_id, stream).await,
            CallCommand::NegotiationFailed {
                peer_id,
                session_id,
                error,
            } => self.negotiation_failed(&peer_id, session_id, error).await,
        }
    }

    // -- Outbound -----------------------------------------------------------

    async fn call_peer(&self, peer_id: String) {
        if let Some(existing) = self.session(&peer_id).await {
            debug!(peer_id = %peer_id, state = %existing.state, "Session exists; ignoring join");
            return;
        }
        let Some(local) = self.audio.local_stream() else {
            warn!(peer_id = %peer_id, error = %RoomError::CaptureMissing, "Cannot call peer");
            return;
        };

        let session_id = self.next_session_id();
        self.sessions.write().await.insert(
            peer_id.clone(),
            SessionEntry {
                session: CallSession {
                    peer_id: peer_id.clone(),
                    direction: CallDirection::Outbound,
                    state: CallState::Negotiating,
                    session_id,
                },
                waiter: None,
            },
        );
        self.publish_state(&peer_id, CallState::Negotiating);

        info!(peer_id = %peer_id, "Calling {}", peer_id);
        match self.negotiator.call(&peer_id, &local).await {
            Ok(handle) => {
                let waiter = self.wait_for_stream(handle, session_id);
                let mut sessions = self.sessions.write().await;
                match sessions.get_mut(&peer_id) {
                    Some(entry) if entry.session.session_id == session_id => {
                        entry.waiter = Some(waiter);
                    }
                    _ => waiter.abort(),
                }
            }
            Err(e) => {
                warn!(peer_id = %peer_id, error = %e, "Outbound call failed");
                self.negotiation_failed(&peer_id, session_id, e).await;
            }
        }
    }

    // -- Inbound ------------------------------------------------------------

    async fn answer(&self, call: IncomingCall) {
        let peer_id = call.peer_id().to_string();
        info!(peer_id = %peer_id, "Call incoming");

        // Off the command loop: a slow roster request must not hold up the
        // answer or other peers' commands. Failures surface through the room
        // client's notifications.
        let room = Arc::clone(&self.room);
        tokio::spawn(async move {
            let _ = room.refresh_roster().await;
        });

        let Some(local) = self.audio.local_stream() else {
            warn!(peer_id = %peer_id, error = %RoomError::CaptureMissing, "Dropping inbound call");
            return;
        };
        let handle = call.answer(&local);

        let mut sessions = self.sessions.write().await;
        if sessions.get(&peer_id).is_some_and(|e| e.session.is_active()) {
            debug!(peer_id = %peer_id, "Already connected; ignoring second stream");
            return;
        }

        let session_id = self.next_session_id();
        let waiter = self.wait_for_stream(handle, session_id);
        let replaced = sessions.insert(
            peer_id.clone(),
            SessionEntry {
                session: CallSession {
                    peer_id: peer_id.clone(),
                    direction: CallDirection::Inbound,
                    state: CallState::Negotiating,
                    session_id,
                },
                waiter: Some(waiter),
            },
        );
        drop(sessions);

        if let Some(old) = replaced {
            debug!(peer_id = %peer_id, "Inbound call replaces pending outbound call");
            old.cancel();
        }
        self.publish_state(&peer_id, CallState::Negotiating);
    }

    // -- Stream arrival -----------------------------------------------------

    fn wait_for_stream(&self, handle: CallHandle, session_id: u64) -> JoinHandle<()> {
        let tx = self.command_tx.clone();
        tokio::spawn(async move {
            let peer_id = handle.peer_id().to_string();
            let command = match handle.remote_stream().await {
                Some(stream) => CallCommand::StreamArrived {
                    peer_id,
                    session_id,
                    stream,
                },
                None => CallCommand::NegotiationFailed {
                    peer_id,
                    session_id,
                    error: RoomError::Negotiation("call ended before media arrived".into()),
                },
            };
            let _ = tx.send(command).await;
        })
    }

    async fn stream_arrived(&self, peer_id: String, session_id: u64, stream: MediaStream) {
        let mut sessions = self.sessions.write().await;
        let Some(entry) = sessions
            .get_mut(&peer_id)
            .filter(|e| e.session.session_id == session_id)
        else {
            debug!(peer_id = %peer_id, session_id, "Discarding stream for stale session");
            return;
        };
        entry.session.state = CallState::Active;
        entry.waiter = None;

        let mut output = self.output.write().await;
        let added = stream
            .audio_tracks()
            .iter()
            .filter(|track| output.add_track(&peer_id, (*track).clone()))
            .count();
        drop(output);
        drop(sessions);

        info!(peer_id = %peer_id, tracks = added, "Call established");
        self.publish_state(&peer_id, CallState::Active);
    }

    async fn negotiation_failed(&self, peer_id: &str, session_id: u64, error: RoomError) {
        let removed = {
            let mut sessions = self.sessions.write().await;
            let current = sessions
                .get(peer_id)
                .is_some_and(|e| e.session.session_id == session_id);
            if current {
                sessions.remove(peer_id)
            } else {
                None
            }
        };
        let Some(entry) = removed else {
            return;
        };
        entry.cancel();

        warn!(peer_id, error = %error, "Call failed");
        self.notifier
            .warning(format!("Could not connect audio with {peer_id}: {error}"));
        self.publish_state(peer_id, CallState::Closed);
    }

    // -- Teardown -----------------------------------------------------------

    async fn tear_down(&self, peer_id: &str) {
        let Some(entry) = self.sessions.write().await.remove(peer_id) else {
            debug!(peer_id, "No session to tear down");
            return;
        };
        entry.cancel();

        let removed = self.output.write().await.remove_peer(peer_id);
        info!(peer_id, tracks = removed, "Call closed");
        self.publish_state(peer_id, CallState::Closed);
    }

    /// Tear down every session, e.g. when leaving the room.
    pub async fn close_all(&self) {
        let peers: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        for peer_id in peers {
            self.tear_down(&peer_id).await;
        }
    }

    // -- Queries ------------------------------------------------------------

    pub async fn session(&self, peer_id: &str) -> Option<CallSession> {
        self.sessions
            .read()
            .await
            .get(peer_id)
            .map(|e| e.session.clone())
    }

    /// Snapshot of every session, ordered by peer id.
    pub async fn sessions(&self) -> Vec<CallSession> {
        let mut sessions: Vec<CallSession> = self
            .sessions
            .read()
            .await
            .values()
            .map(|e| e.session.clone())
            .collect();
        sessions.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        sessions
    }

    fn next_session_id(&self) -> u64 {
        self.next_session_id.fetch_add(1, Ordering::Relaxed)
    }

    fn publish_state(&self, peer_id: &str, state: CallState) {
        self.notifier.publish(Event::CallStateChanged {
            peer_id: peer_id.to_string(),
            state,
        });
    }
}

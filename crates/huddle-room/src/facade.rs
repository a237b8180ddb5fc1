//! The room facade: the four user operations plus read access to state.
//!
//! Everything a room needs arrives through a [`SessionContext`]; nothing is
//! held in globals. Background work (presence pump, inbound-call pump, call
//! orchestrator loop) starts on the first successful create/join and stops
//! on [`Room::shutdown`]. Joining a different room later closes the old
//! room's calls and moves presence to the new room.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use huddle_common::{Event, Notification, Participant, RoomError};
use huddle_config::{HuddleConfig, LocalStore};
use tokio::sync::{broadcast, mpsc, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::audio::AudioSession;
use crate::calls::{CallCommand, CallOrchestrator, CallSession};
use crate::identity::Identity;
use crate::media::{MediaCapture, MergedOutput};
use crate::negotiation::{IncomingCall, Negotiator};
use crate::notifier::Notifier;
use crate::presence::{PresenceChannel, PresenceTransport, SocketIoTransport};
use crate::room_client::{HttpRoomService, RoomClient, RoomService};

// ---------------------------------------------------------------------------
// Session Context
// ---------------------------------------------------------------------------

/// Collaborators and settings for one room session.
pub struct SessionContext {
    pub identity: Identity,
    pub config: HuddleConfig,
    pub service: Arc<dyn RoomService>,
    pub presence: Arc<dyn PresenceTransport>,
    pub negotiator: Arc<dyn Negotiator>,
    pub capture: Arc<dyn MediaCapture>,
    /// Inbound calls from the negotiation stack.
    pub incoming_calls: mpsc::Receiver<IncomingCall>,
    pub store: Option<LocalStore>,
}

impl SessionContext {
    /// Context over the HTTP membership service and Socket.IO presence
    /// endpoints named in `config`.
    ///
    /// The negotiation stack and capture device are supplied by the caller;
    /// the stack should be registered under `identity.user_id` using
    /// `config.peer`.
    pub fn connect(
        config: HuddleConfig,
        identity: Identity,
        negotiator: Arc<dyn Negotiator>,
        capture: Arc<dyn MediaCapture>,
        incoming_calls: mpsc::Receiver<IncomingCall>,
    ) -> Result<Self, RoomError> {
        let service = HttpRoomService::new(config.service.clone())?;
        let presence = SocketIoTransport::new(
            config.presence.clone(),
            config.service.path.clone(),
            identity.user_id.clone(),
        );
        let store = match LocalStore::open_default() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!(error = %e, "Local storage unavailable; display name will not be remembered");
                None
            }
        };

        Ok(Self {
            identity,
            config,
            service: Arc::new(service),
            presence: Arc::new(presence),
            negotiator,
            capture,
            incoming_calls,
            store,
        })
    }
}

/// Queues held until activation.
struct Dormant {
    commands: mpsc::Receiver<CallCommand>,
    incoming_calls: mpsc::Receiver<IncomingCall>,
}

// ---------------------------------------------------------------------------
// Room
// ---------------------------------------------------------------------------

pub struct Room {
    client: Arc<RoomClient>,
    audio: Arc<AudioSession>,
    output: Arc<RwLock<MergedOutput>>,
    orchestrator: Arc<CallOrchestrator>,
    presence: Arc<dyn PresenceTransport>,
    notifier: Notifier,
    dormant: Mutex<Option<Dormant>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    /// Pump for the current room's presence events; replaced on room switch.
    presence_task: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl Room {
    pub fn new(ctx: SessionContext) -> Self {
        let notifier = Notifier::default();
        let output = Arc::new(RwLock::new(MergedOutput::new()));
        let audio = Arc::new(AudioSession::new(
            ctx.capture,
            Arc::clone(&output),
            notifier.clone(),
        ));
        let client = Arc::new(RoomClient::new(
            ctx.identity,
            ctx.config.limits,
            ctx.service,
            Arc::clone(&audio),
            ctx.store,
            notifier.clone(),
        ));
        let (orchestrator, commands) = CallOrchestrator::new(
            ctx.negotiator,
            Arc::clone(&audio),
            Arc::clone(&client),
            Arc::clone(&output),
            notifier.clone(),
        );

        Self {
            client,
            audio,
            output,
            orchestrator,
            presence: ctx.presence,
            notifier,
            dormant: Mutex::new(Some(Dormant {
                commands,
                incoming_calls: ctx.incoming_calls,
            })),
            tasks: Mutex::new(Vec::new()),
            presence_task: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    // -- Operations ---------------------------------------------------------

    /// Create a room and join it. Returns the new room id.
    ///
    /// Calls from a room joined earlier are closed first.
    pub async fn create(&self, name: &str) -> Result<String, RoomError> {
        self.ensure_open()?;
        let previous = self.client.room_id().await;
        let room_id = self.client.create(name).await?;
        self.entered(previous).await;
        Ok(room_id)
    }

    /// Join an existing room, leaving the calls of any other room behind.
    pub async fn join(&self, room_id: &str, name: &str) -> Result<(), RoomError> {
        self.ensure_open()?;
        let previous = self.client.room_id().await;
        self.client.join(room_id, name).await?;
        self.entered(previous).await;
        Ok(())
    }

    /// Returns the new local mute flag. No-op before capture.
    pub fn toggle_local_mute(&self) -> bool {
        self.audio.toggle_local_mute()
    }

    /// Returns the new remote mute flag.
    pub async fn toggle_remote_mute(&self) -> bool {
        self.audio.toggle_remote_mute().await
    }

    fn ensure_open(&self) -> Result<(), RoomError> {
        if self.closed.load(Ordering::SeqCst) {
            let err = RoomError::Closed;
            self.notifier.error(err.to_string());
            return Err(err);
        }
        Ok(())
    }

    /// After a successful create/join: start the background work the first
    /// time, or move presence and calls over when the room changed.
    async fn entered(&self, previous: Option<String>) {
        let Some(room_id) = self.client.room_id().await else {
            return;
        };
        if self.activate(&room_id).await || previous.as_deref() == Some(room_id.as_str()) {
            return;
        }

        info!(from = ?previous, to = %room_id, "Switching rooms");
        if let Some(task) = self.presence_task.lock().await.take() {
            task.abort();
        }
        self.orchestrator.close_all().await;
        self.subscribe_presence(&room_id).await;
    }

    /// Start the orchestrator loop and pumps. Returns false when already
    /// active.
    async fn activate(&self, room_id: &str) -> bool {
        let Some(dormant) = self.dormant.lock().await.take() else {
            return false;
        };

        {
            let mut tasks = self.tasks.lock().await;
            tasks.push(tokio::spawn(
                Arc::clone(&self.orchestrator).run(dormant.commands),
            ));
            tasks.push(tokio::spawn(forward_incoming(
                dormant.incoming_calls,
                self.orchestrator.sender(),
            )));
        }
        self.subscribe_presence(room_id).await;

        info!(room_id, "Room active");
        true
    }

    async fn subscribe_presence(&self, room_id: &str) {
        let mut slot = self.presence_task.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }

        match self.presence.subscribe(room_id).await {
            Ok(events) => {
                let channel = PresenceChannel::new(
                    Arc::clone(&self.client),
                    self.orchestrator.sender(),
                    self.notifier.clone(),
                );
                *slot = Some(tokio::spawn(channel.run(events)));
            }
            Err(e) => {
                warn!(room_id, error = %e, "Presence subscription failed");
                self.notifier
                    .warning(format!("Participants joining later will not be called: {e}"));
            }
        }
    }

    /// Disconnect presence, close every call, stop background tasks and
    /// forget the room.
    ///
    /// This is final: later `create`/`join` calls fail with
    /// [`RoomError::Closed`]. Build a new `Room` to start over.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.presence.disconnect().await;
        if let Some(task) = self.presence_task.lock().await.take() {
            task.abort();
        }
        self.orchestrator.close_all().await;
        for task in self.tasks.lock().await.drain(..) {
            task.abort();
        }
        self.client.leave().await;
        debug!("Room shut down");
    }

    // -- Read access --------------------------------------------------------

    pub async fn joined(&self) -> bool {
        self.client.joined().await
    }

    pub async fn room_id(&self) -> Option<String> {
        self.client.room_id().await
    }

    pub async fn roster(&self) -> Vec<Participant> {
        self.client.roster().await
    }

    pub fn local_muted(&self) -> bool {
        self.audio.local_muted()
    }

    pub fn remote_muted(&self) -> bool {
        self.audio.remote_muted()
    }

    pub async fn sessions(&self) -> Vec<CallSession> {
        self.orchestrator.sessions().await
    }

    /// Snapshot of the merged remote output.
    pub async fn merged_output(&self) -> MergedOutput {
        self.output.read().await.clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifier.visible()
    }

    /// Display name from the previous session, for pre-filling input.
    pub fn last_display_name(&self) -> Option<String> {
        self.client.last_display_name()
    }

    pub fn identity(&self) -> &Identity {
        self.client.identity()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.notifier.bus().subscribe()
    }
}

/// Hand inbound calls from the negotiation stack to the orchestrator queue.
async fn forward_incoming(
    mut incoming: mpsc::Receiver<IncomingCall>,
    commands: mpsc::Sender<CallCommand>,
) {
    while let Some(call) = incoming.recv().await {
        if commands.send(CallCommand::Incoming(call)).await.is_err() {
            break;
        }
    }
    debug!("Inbound call stream closed");
}

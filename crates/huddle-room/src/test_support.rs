//! In-memory collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use huddle_common::{Participant, RoomError};
use huddle_config::LimitsConfig;
use tokio::sync::{mpsc, oneshot, RwLock};

use crate::audio::AudioSession;
use crate::identity::Identity;
use crate::media::{MediaCapture, MediaStream, MergedOutput};
use crate::negotiation::{CallHandle, IncomingCall, Negotiator};
use crate::notifier::Notifier;
use crate::presence::{PresenceTransport, TransportEvent};
use crate::room_client::{CreateRequest, JoinRequest, RoomClient, RoomService};

// ---------------------------------------------------------------------------
// Room service
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ServiceCall {
    Join(JoinRequest),
    Create(CreateRequest),
    ListUsers(String),
}

pub(crate) struct FakeRoomService {
    calls: Mutex<Vec<ServiceCall>>,
    join_error: Mutex<Option<String>>,
    create_result: Mutex<Result<String, String>>,
    users: Mutex<Vec<Participant>>,
    listing_stalled: AtomicBool,
}

impl FakeRoomService {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            join_error: Mutex::new(None),
            create_result: Mutex::new(Ok("7f3a".into())),
            users: Mutex::new(Vec::new()),
            listing_stalled: AtomicBool::new(false),
        }
    }

    pub(crate) fn with_users(self, users: Vec<Participant>) -> Self {
        *self.users.lock().unwrap() = users;
        self
    }

    pub(crate) fn with_create_result(self, result: Result<&str, &str>) -> Self {
        *self.create_result.lock().unwrap() = result.map(String::from).map_err(String::from);
        self
    }

    pub(crate) fn with_join_error(self, message: &str) -> Self {
        *self.join_error.lock().unwrap() = Some(message.into());
        self
    }

    pub(crate) fn set_users(&self, users: Vec<Participant>) {
        *self.users.lock().unwrap() = users;
    }

    /// Make every later `list_users` hang forever, like a request to an
    /// unresponsive server.
    pub(crate) fn stall_listing(&self) {
        self.listing_stalled.store(true, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ServiceCall::ListUsers(_)))
            .count()
    }
}

#[async_trait]
impl RoomService for FakeRoomService {
    async fn join(&self, request: &JoinRequest) -> Result<(), RoomError> {
        self.calls
            .lock()
            .unwrap()
            .push(ServiceCall::Join(request.clone()));
        match self.join_error.lock().unwrap().clone() {
            Some(message) => Err(RoomError::Service(message)),
            None => Ok(()),
        }
    }

    async fn create(&self, request: &CreateRequest) -> Result<String, RoomError> {
        self.calls
            .lock()
            .unwrap()
            .push(ServiceCall::Create(request.clone()));
        self.create_result
            .lock()
            .unwrap()
            .clone()
            .map_err(RoomError::Service)
    }

    async fn list_users(&self, room_id: &str) -> Result<Vec<Participant>, RoomError> {
        self.calls
            .lock()
            .unwrap()
            .push(ServiceCall::ListUsers(room_id.to_string()));
        if self.listing_stalled.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(self.users.lock().unwrap().clone())
    }
}

// ---------------------------------------------------------------------------
// Capture
// ---------------------------------------------------------------------------

pub(crate) struct FakeCapture {
    requests: AtomicUsize,
    failing: AtomicBool,
}

impl FakeCapture {
    pub(crate) fn new() -> Self {
        Self {
            requests: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn failing() -> Self {
        let capture = Self::new();
        capture.set_failing(true);
        capture
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaCapture for FakeCapture {
    async fn capture_audio(&self) -> Result<MediaStream, RoomError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(RoomError::Capture("permission denied".into()));
        }
        Ok(MediaStream::single_track())
    }
}

// ---------------------------------------------------------------------------
// Negotiator
// ---------------------------------------------------------------------------

/// Records outbound calls; tests decide when (or whether) streams arrive.
pub(crate) struct FakeNegotiator {
    calls: Mutex<Vec<(String, String)>>,
    pending: Mutex<HashMap<String, Vec<oneshot::Sender<MediaStream>>>>,
    failing: AtomicBool,
}

impl FakeNegotiator {
    pub(crate) fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            pending: Mutex::new(HashMap::new()),
            failing: AtomicBool::new(false),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// `(peer_id, local_stream_id)` for each outbound call, in order.
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, peer_id: &str) -> usize {
        self.calls().iter().filter(|(p, _)| p == peer_id).count()
    }

    /// Deliver a remote stream on the oldest pending call to `peer_id`.
    pub(crate) fn deliver(&self, peer_id: &str) -> Option<MediaStream> {
        let tx = {
            let mut pending = self.pending.lock().unwrap();
            let queue = pending.get_mut(peer_id)?;
            if queue.is_empty() {
                return None;
            }
            queue.remove(0)
        };
        let stream = MediaStream::single_track();
        tx.send(stream.clone()).ok()?;
        Some(stream)
    }

    /// Give up on the oldest pending call to `peer_id` without a stream.
    pub(crate) fn abandon(&self, peer_id: &str) {
        let mut pending = self.pending.lock().unwrap();
        if let Some(queue) = pending.get_mut(peer_id) {
            if !queue.is_empty() {
                queue.remove(0);
            }
        }
    }
}

#[async_trait]
impl Negotiator for FakeNegotiator {
    async fn call(&self, peer_id: &str, local: &MediaStream) -> Result<CallHandle, RoomError> {
        self.calls
            .lock()
            .unwrap()
            .push((peer_id.to_string(), local.id().to_string()));
        if self.failing.load(Ordering::SeqCst) {
            return Err(RoomError::Negotiation("peer unreachable".into()));
        }
        let (handle, tx) = CallHandle::pair(peer_id);
        self.pending
            .lock()
            .unwrap()
            .entry(peer_id.to_string())
            .or_default()
            .push(tx);
        Ok(handle)
    }
}

/// An inbound call plus the ends the negotiation stack would hold.
pub(crate) struct InboundCall {
    pub call: IncomingCall,
    pub answer_rx: oneshot::Receiver<MediaStream>,
    pub stream_tx: oneshot::Sender<MediaStream>,
}

pub(crate) fn inbound_call(peer_id: &str) -> InboundCall {
    let (answer_tx, answer_rx) = oneshot::channel();
    let (stream_tx, stream_rx) = oneshot::channel();
    InboundCall {
        call: IncomingCall::new(peer_id, answer_tx, stream_rx),
        answer_rx,
        stream_tx,
    }
}

// ---------------------------------------------------------------------------
// Presence
// ---------------------------------------------------------------------------

pub(crate) struct FakePresence {
    tx: Mutex<Option<mpsc::Sender<TransportEvent>>>,
    subscriptions: Mutex<Vec<String>>,
    disconnected: AtomicBool,
}

impl FakePresence {
    pub(crate) fn new() -> Self {
        Self {
            tx: Mutex::new(None),
            subscriptions: Mutex::new(Vec::new()),
            disconnected: AtomicBool::new(false),
        }
    }

    pub(crate) fn subscriptions(&self) -> Vec<String> {
        self.subscriptions.lock().unwrap().clone()
    }

    pub(crate) fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    pub(crate) async fn emit(&self, event: TransportEvent) {
        let tx = self.tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            let _ = tx.send(event).await;
        }
    }
}

#[async_trait]
impl PresenceTransport for FakePresence {
    async fn subscribe(&self, room_id: &str) -> Result<mpsc::Receiver<TransportEvent>, RoomError> {
        let (tx, rx) = mpsc::channel(64);
        *self.tx.lock().unwrap() = Some(tx);
        self.subscriptions.lock().unwrap().push(room_id.to_string());
        Ok(rx)
    }

    async fn disconnect(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
        self.tx.lock().unwrap().take();
    }
}

// ---------------------------------------------------------------------------
// Wiring helpers
// ---------------------------------------------------------------------------

/// A room client over fakes, already joined to `room_id` with capture done.
pub(crate) struct Harness {
    pub service: Arc<FakeRoomService>,
    pub capture: Arc<FakeCapture>,
    pub audio: Arc<AudioSession>,
    pub output: Arc<RwLock<MergedOutput>>,
    pub client: Arc<RoomClient>,
    pub notifier: Notifier,
}

impl Harness {
    pub(crate) fn new(service: FakeRoomService) -> Self {
        let service = Arc::new(service);
        let capture = Arc::new(FakeCapture::new());
        let output = Arc::new(RwLock::new(MergedOutput::new()));
        let notifier = Notifier::default();
        let audio = Arc::new(AudioSession::new(
            Arc::clone(&capture) as Arc<dyn MediaCapture>,
            Arc::clone(&output),
            notifier.clone(),
        ));
        let client = Arc::new(RoomClient::new(
            Identity::with_id("me"),
            LimitsConfig::default(),
            Arc::clone(&service) as Arc<dyn RoomService>,
            Arc::clone(&audio),
            None,
            notifier.clone(),
        ));
        Self {
            service,
            capture,
            audio,
            output,
            client,
            notifier,
        }
    }

    pub(crate) async fn joined(service: FakeRoomService, room_id: &str) -> Self {
        let harness = Self::new(service);
        harness
            .client
            .join(room_id, "me")
            .await
            .expect("fake join succeeds");
        harness
    }
}

/// Poll an (async) condition until it holds, failing the test after two seconds.
macro_rules! wait_for {
    ($cond:expr) => {{
        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(2);
        while !$cond {
            assert!(
                tokio::time::Instant::now() < deadline,
                "condition not reached within 2s: {}",
                stringify!($cond)
            );
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
    }};
}
pub(crate) use wait_for;

/// Let spawned tasks run until the queue settles.
pub(crate) async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(20)).await;
}

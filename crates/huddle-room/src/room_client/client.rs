//! Room client: validation, capture, service round trip, membership state.

use std::sync::Arc;

use huddle_common::{Event, Participant, RoomError};
use huddle_config::{LimitsConfig, LocalStore};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::audio::AudioSession;
use crate::identity::Identity;
use crate::notifier::Notifier;

use super::service::RoomService;
use super::types::{CreateRequest, JoinRequest};
use super::validation::{validate_join, validate_name};

#[derive(Debug, Default)]
struct Membership {
    joined: bool,
    room_id: Option<String>,
    display_name: Option<String>,
    roster: Vec<Participant>,
}

pub struct RoomClient {
    identity: Identity,
    limits: LimitsConfig,
    service: Arc<dyn RoomService>,
    audio: Arc<AudioSession>,
    store: Option<LocalStore>,
    notifier: Notifier,
    membership: RwLock<Membership>,
}

impl RoomClient {
    pub fn new(
        identity: Identity,
        limits: LimitsConfig,
        service: Arc<dyn RoomService>,
        audio: Arc<AudioSession>,
        store: Option<LocalStore>,
        notifier: Notifier,
    ) -> Self {
        Self {
            identity,
            limits,
            service,
            audio,
            store,
            notifier,
            membership: RwLock::new(Membership::default()),
        }
    }

    /// Create a room and join it. Returns the service-assigned room id.
    ///
    /// Invalid names are rejected without touching the network.
    pub async fn create(&self, name: &str) -> Result<String, RoomError> {
        let result = self.try_create(name).await;
        self.report(result)
    }

    /// Join an existing room.
    pub async fn join(&self, room_id: &str, name: &str) -> Result<(), RoomError> {
        let result = self.try_join(room_id, name).await;
        self.report(result)
    }

    /// Fetch the roster for the current room and cache it.
    pub async fn refresh_roster(&self) -> Result<Vec<Participant>, RoomError> {
        let Some(room_id) = self.room_id().await else {
            return Err(RoomError::NotJoined);
        };
        let result = self.service.list_users(&room_id).await;
        let roster = self.report(result)?;

        self.membership.write().await.roster = roster.clone();
        self.notifier.publish(Event::RosterUpdated(roster.clone()));
        Ok(roster)
    }

    async fn try_create(&self, name: &str) -> Result<String, RoomError> {
        validate_name(name, &self.limits)?;
        self.audio.acquire_capture().await?;

        let request = CreateRequest {
            user_id: self.identity.user_id.clone(),
            user_name: name.to_string(),
        };
        let room_id = self.service.create(&request).await?;

        info!(room_id = %room_id, "Room created");
        self.enter(&room_id, name).await;
        Ok(room_id)
    }

    async fn try_join(&self, room_id: &str, name: &str) -> Result<(), RoomError> {
        validate_join(room_id, name, &self.limits)?;
        self.audio.acquire_capture().await?;

        let request = JoinRequest {
            room_id: room_id.to_string(),
            user_id: self.identity.user_id.clone(),
            user_name: name.to_string(),
        };
        self.service.join(&request).await?;

        info!(room_id, "Joined room");
        self.enter(room_id, name).await;
        Ok(())
    }

    /// Record a successful create/join: cache the name, flip the membership
    /// flag, then load the roster.
    async fn enter(&self, room_id: &str, name: &str) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save_display_name(name) {
                warn!(error = %e, "Failed to persist display name");
            }
        }

        {
            let mut membership = self.membership.write().await;
            membership.joined = true;
            membership.room_id = Some(room_id.to_string());
            membership.display_name = Some(name.to_string());
        }
        self.notifier.publish(Event::MembershipChanged {
            room_id: room_id.to_string(),
        });

        // Failures are already surfaced as notifications.
        let _ = self.refresh_roster().await;
    }

    /// Forget the current room. The saved display name is kept.
    pub async fn leave(&self) {
        let mut membership = self.membership.write().await;
        if let Some(room_id) = membership.room_id.take() {
            info!(room_id = %room_id, "Left room");
        }
        membership.joined = false;
        membership.roster.clear();
    }

    fn report<T>(&self, result: Result<T, RoomError>) -> Result<T, RoomError> {
        if let Err(e) = &result {
            warn!(error = %e, "Room request failed");
            self.notifier.error(e.to_string());
        }
        result
    }

    pub async fn joined(&self) -> bool {
        self.membership.read().await.joined
    }

    pub async fn room_id(&self) -> Option<String> {
        self.membership.read().await.room_id.clone()
    }

    pub async fn display_name(&self) -> Option<String> {
        self.membership.read().await.display_name.clone()
    }

    pub async fn roster(&self) -> Vec<Participant> {
        self.membership.read().await.roster.clone()
    }

    /// Display name saved by a previous session, for pre-filling input.
    pub fn last_display_name(&self) -> Option<String> {
        let store = self.store.as_ref()?;
        match store.last_display_name() {
            Ok(name) => name,
            Err(e) => {
                warn!(error = %e, "Failed to read saved display name");
                None
            }
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

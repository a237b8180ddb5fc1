//! The presence transport seam and its Socket.IO implementation.

use std::time::Duration;

use async_trait::async_trait;
use huddle_common::RoomError;
use huddle_config::PresenceConfig;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

use super::connection::{connection_loop, ConnectionCommand, ConnectionSettings};
use super::types::TransportEvent;

#[async_trait]
pub trait PresenceTransport: Send + Sync {
    /// Start delivering presence events for `room_id`.
    ///
    /// Events arrive in transport order. A later `subscribe` replaces the
    /// earlier subscription.
    async fn subscribe(&self, room_id: &str) -> Result<mpsc::Receiver<TransportEvent>, RoomError>;

    async fn disconnect(&self);
}

/// Presence over a Socket.IO websocket.
///
/// The server scopes events by the `userId` query parameter, so the room id
/// is only used for logging here.
pub struct SocketIoTransport {
    config: PresenceConfig,
    path_prefix: String,
    user_id: String,
    command_tx: Mutex<Option<mpsc::Sender<ConnectionCommand>>>,
}

impl SocketIoTransport {
    pub fn new(
        config: PresenceConfig,
        path_prefix: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            config,
            path_prefix: path_prefix.into(),
            user_id: user_id.into(),
            command_tx: Mutex::new(None),
        }
    }

    fn settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            url: self.config.socket_url(&self.path_prefix, &self.user_id),
            heartbeat: Duration::from_secs(u64::from(self.config.heartbeat_interval_secs)),
            reconnect_delay_secs: u64::from(self.config.reconnect_delay_secs),
            max_reconnect_delay_secs: u64::from(self.config.max_reconnect_delay_secs),
        }
    }

    pub async fn is_running(&self) -> bool {
        self.command_tx
            .lock()
            .await
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

#[async_trait]
impl PresenceTransport for SocketIoTransport {
    async fn subscribe(&self, room_id: &str) -> Result<mpsc::Receiver<TransportEvent>, RoomError> {
        let mut slot = self.command_tx.lock().await;
        if let Some(previous) = slot.take() {
            let _ = previous.send(ConnectionCommand::Disconnect).await;
        }

        let (event_tx, event_rx) = mpsc::channel(256);
        let (command_tx, command_rx) = mpsc::channel(8);
        info!(room_id, user_id = %self.user_id, "Subscribing to presence");
        tokio::spawn(connection_loop(self.settings(), event_tx, command_rx));

        *slot = Some(command_tx);
        Ok(event_rx)
    }

    async fn disconnect(&self) {
        if let Some(tx) = self.command_tx.lock().await.take() {
            let _ = tx.send(ConnectionCommand::Disconnect).await;
        }
    }
}

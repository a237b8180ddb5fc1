//! The room-membership service seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use huddle_common::{Participant, RoomError};
use huddle_config::ServiceConfig;
use serde::de::IgnoredAny;
use tracing::debug;

use super::types::{ApiResponse, CreateRequest, JoinRequest};

#[async_trait]
pub trait RoomService: Send + Sync {
    async fn join(&self, request: &JoinRequest) -> Result<(), RoomError>;

    /// Returns the newly assigned room id.
    async fn create(&self, request: &CreateRequest) -> Result<String, RoomError>;

    async fn list_users(&self, room_id: &str) -> Result<Vec<Participant>, RoomError>;
}

/// Talks to the membership service over HTTP/JSON.
pub struct HttpRoomService {
    config: ServiceConfig,
    http: reqwest::Client,
}

impl HttpRoomService {
    pub fn new(config: ServiceConfig) -> Result<Self, RoomError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(u64::from(config.request_timeout_secs)))
            .build()
            .map_err(|e| RoomError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, http })
    }

    async fn decode(response: reqwest::Response) -> Result<ApiResponse, RoomError> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| RoomError::Transport(e.to_string()))?;

        match serde_json::from_str::<ApiResponse>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => {
                Err(RoomError::Transport(format!("HTTP {status}: {text}")))
            }
            Err(e) => Err(RoomError::Transport(format!("malformed response: {e}"))),
        }
    }
}

#[async_trait]
impl RoomService for HttpRoomService {
    async fn join(&self, request: &JoinRequest) -> Result<(), RoomError> {
        let url = self.config.endpoint("join");
        debug!(url = %url, room_id = %request.room_id, "POST join");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RoomError::Transport(e.to_string()))?;
        Self::decode(response).await?.into_result::<IgnoredAny>()?;
        Ok(())
    }

    async fn create(&self, request: &CreateRequest) -> Result<String, RoomError> {
        let url = self.config.endpoint("create");
        debug!(url = %url, "POST create");
        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| RoomError::Transport(e.to_string()))?;
        Self::decode(response).await?.into_result()
    }

    async fn list_users(&self, room_id: &str) -> Result<Vec<Participant>, RoomError> {
        let url = self.config.endpoint("getUsers");
        debug!(url = %url, room_id, "GET getUsers");
        let response = self
            .http
            .get(&url)
            .query(&[("roomId", room_id)])
            .send()
            .await
            .map_err(|e| RoomError::Transport(e.to_string()))?;
        Self::decode(response).await?.into_result()
    }
}

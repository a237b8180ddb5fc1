//! Presence event transport configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// WebSocket base URL, e.g. `wss://rooms.example.org`.
    pub ws_url: String,
    pub heartbeat_interval_secs: u32,
    pub reconnect_delay_secs: u32,
    pub max_reconnect_delay_secs: u32,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            ws_url: "ws://localhost:3000".into(),
            heartbeat_interval_secs: 25,
            reconnect_delay_secs: 1,
            max_reconnect_delay_secs: 30,
        }
    }
}

impl PresenceConfig {
    /// Socket endpoint for `user_id`, using the service path prefix.
    pub fn socket_url(&self, path_prefix: &str, user_id: &str) -> String {
        format!(
            "{}{}/socket.io/?EIO=4&transport=websocket&userId={}",
            self.ws_url.trim_end_matches('/'),
            path_prefix.trim_end_matches('/'),
            user_id
        )
    }
}

//! Peer negotiation broker and ICE server configuration.
//!
//! The core never talks to the broker itself; these values are handed to
//! whichever negotiator implementation the application plugs in.

use serde::{Deserialize, Serialize};

/// A STUN or TURN server used during connectivity checks.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
}

impl std::fmt::Debug for IceServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IceServerConfig")
            .field("urls", &self.urls)
            .field("username", &self.username)
            .field("credential", &self.credential.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
    pub host: String,
    pub port: u32,
    pub path: String,
    pub ice_servers: Vec<IceServerConfig>,
}

impl Default for PeerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8848,
            path: "/peer".into(),
            ice_servers: Vec::new(),
        }
    }
}

impl PeerConfig {
    /// Broker path including the service prefix, e.g. `/voice/peer`.
    pub fn broker_path(&self, path_prefix: &str) -> String {
        format!("{}{}", path_prefix.trim_end_matches('/'), self.path)
    }
}

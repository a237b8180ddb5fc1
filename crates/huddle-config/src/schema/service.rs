//! Room-membership service endpoint configuration.

use serde::{Deserialize, Serialize};

/// Where the room-membership HTTP service lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL without trailing slash, e.g. `https://rooms.example.org`.
    pub http_url: String,
    /// Path prefix shared by the HTTP, socket and peer endpoints.
    pub path: String,
    pub request_timeout_secs: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_url: "http://localhost:3000".into(),
            path: String::new(),
            request_timeout_secs: 10,
        }
    }
}

impl ServiceConfig {
    /// Full URL for an endpoint such as `join` or `getUsers`.
    pub fn endpoint(&self, name: &str) -> String {
        format!(
            "{}{}/{}",
            self.http_url.trim_end_matches('/'),
            self.path.trim_end_matches('/'),
            name
        )
    }
}

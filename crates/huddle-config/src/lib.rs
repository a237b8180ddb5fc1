//! Huddle configuration.
//!
//! TOML-based configuration for the room service, presence transport and
//! peer broker endpoints, plus the small persisted local state.
//!
//! ```rust,no_run
//! use huddle_config::load_config;
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config.service.endpoint("join"));
//! ```

pub mod local_store;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use local_store::{LocalStore, DISPLAY_NAME_KEY};
pub use schema::{
    HuddleConfig, IceServerConfig, LimitsConfig, PeerConfig, PresenceConfig, ServiceConfig,
    CONFIG_SCHEMA_VERSION, SERVICE_MAX_LEN,
};
pub use toml_loader::{load_default, load_from_path};

use huddle_common::ConfigError;

/// Load and validate config from the platform default path.
pub fn load_config() -> Result<HuddleConfig, ConfigError> {
    toml_loader::load_default()
}

/// Pretty-printed JSON, for diagnostics.
pub fn config_to_json(config: &HuddleConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

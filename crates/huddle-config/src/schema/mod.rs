//! Configuration schema types.
//!
//! All structs use `serde(default)` so partial configs work.

mod limits;
mod peer;
mod presence;
mod service;

pub use limits::*;
pub use peer::*;
pub use presence::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuddleConfig {
    pub service: ServiceConfig,
    pub presence: PresenceConfig,
    pub peer: PeerConfig,
    pub limits: LimitsConfig,
}

use huddle_common::new_id;
use serde::{Deserialize, Serialize};

/// This process's participant identity.
///
/// Generated once per session context and never changed; the display name is
/// chosen per join/create and lives in the room client instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn generate() -> Self {
        Self { user_id: new_id() }
    }

    /// Reuse a known id, e.g. one issued by an embedding application.
    pub fn with_id(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

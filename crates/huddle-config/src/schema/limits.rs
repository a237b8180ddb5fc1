use serde::{Deserialize, Serialize};

/// Longest room id or display name the membership service accepts.
pub const SERVICE_MAX_LEN: u32 = 10;

/// Length bounds applied to user input before contacting the service.
///
/// Both may be tightened but not raised past [`SERVICE_MAX_LEN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_room_id_len: u32,
    pub max_name_len: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_room_id_len: SERVICE_MAX_LEN,
            max_name_len: SERVICE_MAX_LEN,
        }
    }
}

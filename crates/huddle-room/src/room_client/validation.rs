use huddle_common::ValidationError;
use huddle_config::LimitsConfig;

/// Length in characters, not bytes, so non-ASCII names get the same budget.
fn char_len(s: &str) -> usize {
    s.chars().count()
}

pub fn validate_name(name: &str, limits: &LimitsConfig) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::NameEmpty);
    }
    if char_len(name) > limits.max_name_len as usize {
        return Err(ValidationError::NameTooLong);
    }
    Ok(())
}

/// Checks room id then name, reporting only the first violation.
pub fn validate_join(
    room_id: &str,
    name: &str,
    limits: &LimitsConfig,
) -> Result<(), ValidationError> {
    if room_id.is_empty() {
        return Err(ValidationError::RoomIdEmpty);
    }
    if char_len(room_id) > limits.max_room_id_len as usize {
        return Err(ValidationError::RoomIdTooLong);
    }
    validate_name(name, limits)
}

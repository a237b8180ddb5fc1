//! Validation for timeouts, heartbeat/backoff intervals and input limits.

use crate::schema::{HuddleConfig, SERVICE_MAX_LEN};

use super::helpers::validate_range;

pub(crate) fn validate_timing(errors: &mut Vec<String>, config: &HuddleConfig) {
    validate_range(
        errors,
        "service.request_timeout_secs",
        config.service.request_timeout_secs,
        1,
        120,
    );

    let presence = &config.presence;
    validate_range(
        errors,
        "presence.heartbeat_interval_secs",
        presence.heartbeat_interval_secs,
        5,
        300,
    );
    validate_range(
        errors,
        "presence.reconnect_delay_secs",
        presence.reconnect_delay_secs,
        1,
        60,
    );
    validate_range(
        errors,
        "presence.max_reconnect_delay_secs",
        presence.max_reconnect_delay_secs,
        presence.reconnect_delay_secs,
        600,
    );
}

pub(crate) fn validate_limits(errors: &mut Vec<String>, config: &HuddleConfig) {
    let limits = &config.limits;
    validate_range(
        errors,
        "limits.max_room_id_len",
        limits.max_room_id_len,
        1,
        SERVICE_MAX_LEN,
    );
    validate_range(
        errors,
        "limits.max_name_len",
        limits.max_name_len,
        1,
        SERVICE_MAX_LEN,
    );
}

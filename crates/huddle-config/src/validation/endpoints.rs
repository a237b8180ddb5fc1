//! Validation for service, presence and peer endpoints.

use crate::schema::HuddleConfig;

use super::helpers::{validate_path_prefix, validate_range, validate_scheme};

pub(crate) fn validate_service(errors: &mut Vec<String>, config: &HuddleConfig) {
    validate_scheme(
        errors,
        "service.http_url",
        &config.service.http_url,
        &["http://", "https://"],
    );
    validate_path_prefix(errors, "service.path", &config.service.path);
}

pub(crate) fn validate_presence(errors: &mut Vec<String>, config: &HuddleConfig) {
    validate_scheme(
        errors,
        "presence.ws_url",
        &config.presence.ws_url,
        &["ws://", "wss://"],
    );
}

pub(crate) fn validate_peer(errors: &mut Vec<String>, config: &HuddleConfig) {
    let peer = &config.peer;
    if peer.host.trim().is_empty() {
        errors.push("peer.host must not be empty".into());
    }
    validate_range(errors, "peer.port", peer.port, 1, 65535);
    if !peer.path.starts_with('/') {
        errors.push(format!("peer.path = {:?} must start with '/'", peer.path));
    }

    for (i, server) in peer.ice_servers.iter().enumerate() {
        let name = format!("peer.ice_servers[{i}].urls");
        validate_scheme(
            errors,
            &name,
            &server.urls,
            &["stun:", "stuns:", "turn:", "turns:"],
        );
        // TURN relays always authenticate.
        if server.urls.starts_with("turn") && (server.username.is_none() || server.credential.is_none())
        {
            errors.push(format!(
                "peer.ice_servers[{i}] is a TURN server and needs username and credential"
            ));
        }
    }
}

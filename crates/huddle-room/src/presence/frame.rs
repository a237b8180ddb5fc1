//! Engine.IO v4 / Socket.IO text frame codec.
//!
//! Only the subset a presence subscriber needs: the open handshake,
//! heartbeats, namespace connect/disconnect, and event packets.

use serde::Deserialize;
use serde_json::Value;

use super::types::{events, PresenceEvent};

/// Namespace connect for the default namespace.
pub(crate) const CONNECT: &str = "40";

/// Namespace disconnect for the default namespace.
pub(crate) const DISCONNECT: &str = "41";

/// Payload of the Engine.IO open packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OpenInfo {
    #[serde(default)]
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Frame {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    Noop,
    Connected,
    ConnectError(String),
    Disconnected,
    Event { name: String, args: Vec<Value> },
    Unknown(String),
}

/// Decode a single text frame.
pub(crate) fn decode(text: &str) -> Frame {
    let mut chars = text.chars();
    let Some(kind) = chars.next() else {
        return Frame::Unknown(String::new());
    };
    let rest = chars.as_str();

    match kind {
        '0' => match serde_json::from_str::<OpenInfo>(rest) {
            Ok(info) => Frame::Open(info),
            Err(_) => Frame::Unknown(text.to_string()),
        },
        '1' => Frame::Close,
        '2' => Frame::Ping(rest.to_string()),
        '3' => Frame::Pong(rest.to_string()),
        '4' => decode_packet(rest).unwrap_or_else(|| Frame::Unknown(text.to_string())),
        '6' => Frame::Noop,
        _ => Frame::Unknown(text.to_string()),
    }
}

/// Decode a Socket.IO packet carried in an Engine.IO message frame.
fn decode_packet(packet: &str) -> Option<Frame> {
    let mut chars = packet.chars();
    let kind = chars.next()?;
    let body = skip_namespace(chars.as_str());

    match kind {
        '0' => Some(Frame::Connected),
        '1' => Some(Frame::Disconnected),
        '2' => {
            // Optional ack id precedes the JSON array.
            let body = body.trim_start_matches(|c: char| c.is_ascii_digit());
            let mut array = serde_json::from_str::<Vec<Value>>(body).ok()?.into_iter();
            let name = array.next()?.as_str()?.to_string();
            Some(Frame::Event {
                name,
                args: array.collect(),
            })
        }
        '4' => {
            let message = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| body.to_string());
            Some(Frame::ConnectError(message))
        }
        _ => None,
    }
}

/// Strip a `/nsp,` prefix if present.
fn skip_namespace(body: &str) -> &str {
    if body.starts_with('/') {
        match body.find(',') {
            Some(comma) => &body[comma + 1..],
            None => "",
        }
    } else {
        body
    }
}

/// Reply to a server ping, echoing any probe payload.
pub(crate) fn pong(data: &str) -> String {
    format!("3{data}")
}

/// Map a Socket.IO event onto a presence event, if it is one.
///
/// The first argument carries the peer id, either as a bare string or as an
/// object with a `userId` field.
pub(crate) fn presence_from_event(name: &str, args: &[Value]) -> Option<PresenceEvent> {
    let peer_id = match args.first()? {
        Value::String(id) => id.clone(),
        Value::Object(map) => map.get("userId")?.as_str()?.to_string(),
        _ => return None,
    };
    if peer_id.is_empty() {
        return None;
    }

    match name {
        events::USER_JOIN => Some(PresenceEvent::Joined { peer_id }),
        events::USER_LEAVE => Some(PresenceEvent::Left { peer_id }),
        _ => None,
    }
}

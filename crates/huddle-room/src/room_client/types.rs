//! Wire types for the room-membership service.

use huddle_common::RoomError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub room_id: String,
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub user_id: String,
    pub user_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
}

/// The `{status, content}` envelope every endpoint answers with.
///
/// `content` is endpoint-specific on success and a user-facing message on error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ApiStatus,
    #[serde(default)]
    pub content: serde_json::Value,
}

impl ApiResponse {
    /// Decode `content` as `T` on success, or turn the error message into
    /// [`RoomError::Service`].
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, RoomError> {
        match self.status {
            ApiStatus::Success => serde_json::from_value(self.content)
                .map_err(|e| RoomError::Transport(format!("unexpected response content: {e}"))),
            ApiStatus::Error => Err(RoomError::Service(match self.content {
                serde_json::Value::String(message) => message,
                other => other.to_string(),
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_common::Participant;

    #[test]
    fn join_request_uses_camel_case() {
        let req = JoinRequest {
            room_id: "ab".into(),
            user_id: "u1".into(),
            user_name: "bob".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["roomId"], "ab");
        assert_eq!(json["userId"], "u1");
        assert_eq!(json["userName"], "bob");
    }

    #[test]
    fn create_success_yields_room_id() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"status":"success","content":"7f3a"}"#).unwrap();
        assert_eq!(resp.into_result::<String>().unwrap(), "7f3a");
    }

    #[test]
    fn error_status_yields_service_message() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"status":"error","content":"room does not exist"}"#).unwrap();
        let err = resp.into_result::<String>().unwrap_err();
        assert!(matches!(err, RoomError::Service(ref m) if m == "room does not exist"));
    }

    #[test]
    fn user_list_decodes() {
        let resp: ApiResponse = serde_json::from_str(
            r#"{"status":"success","content":[{"userId":"u1","userName":"alice"}]}"#,
        )
        .unwrap();
        let users: Vec<Participant> = resp.into_result().unwrap();
        assert_eq!(users, vec![Participant::new("u1", "alice")]);
    }

    #[test]
    fn unexpected_content_is_transport_error() {
        let resp: ApiResponse =
            serde_json::from_str(r#"{"status":"success","content":42}"#).unwrap();
        assert!(matches!(
            resp.into_result::<Vec<Participant>>(),
            Err(RoomError::Transport(_))
        ));
    }

    #[test]
    fn missing_content_is_ignorable() {
        let resp: ApiResponse = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(resp.into_result::<serde::de::IgnoredAny>().is_ok());
    }
}

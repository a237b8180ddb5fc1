use std::path::PathBuf;

/// Input rejected before any network call is made.
///
/// The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("room id cannot be empty")]
    RoomIdEmpty,

    #[error("room id is too long")]
    RoomIdTooLong,

    #[error("display name cannot be empty")]
    NameEmpty,

    #[error("display name is too long")]
    NameTooLong,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),

    #[error("local state error: {0}")]
    StateError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The room-membership service answered with `status: error`.
    #[error("{0}")]
    Service(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("media capture failed: {0}")]
    Capture(String),

    #[error("local audio has not been captured yet")]
    CaptureMissing,

    #[error("negotiation error: {0}")]
    Negotiation(String),

    #[error("not joined to a room")]
    NotJoined,

    /// The room was shut down and cannot be joined again.
    #[error("room has been shut down")]
    Closed,
}

impl RoomError {
    /// Whether the error came from user input rather than a collaborator.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

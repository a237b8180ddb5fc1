pub mod errors;
pub mod events;
pub mod id;
pub mod notifications;
pub mod types;

pub use errors::{ConfigError, RoomError, ValidationError};
pub use events::{Event, EventBus};
pub use id::{new_id, new_short_id};
pub use notifications::{Notification, NotificationLevel, NotificationQueue};
pub use types::{CallDirection, CallState, Participant};

pub type Result<T> = std::result::Result<T, RoomError>;

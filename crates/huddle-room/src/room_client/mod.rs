//! Room membership: create, join and roster refresh against the
//! room-membership service.
//!
//! Input is validated locally first. Every failure is both returned and
//! pushed as a user-visible notification; the membership flag is what
//! downstream components check before activating.

mod client;
mod service;
mod types;
mod validation;


pub use client::RoomClient;
pub use service::{HttpRoomService, RoomService};
pub use types::{ApiResponse, ApiStatus, CreateRequest, JoinRequest};
pub use validation::{validate_join, validate_name};

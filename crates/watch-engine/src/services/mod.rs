//! Room engine services
//!
//! Borrowed-context services carrying the business rules: room lifecycle
//! and membership, host-authority playback, and heartbeat-driven presence.
//! Services do not take locks themselves; the engine facade serializes
//! commands per room before calling in.

pub mod playback;
pub mod presence;
pub mod room;

pub use playback::PlaybackService;
pub use presence::PresenceService;
pub use room::RoomService;

use watch_core::error::DomainError;

/// Map shape-validation failures onto the domain error space
pub(crate) fn validation_error(errors: &validator::ValidationErrors) -> DomainError {
    DomainError::Validation(errors.to_string())
}

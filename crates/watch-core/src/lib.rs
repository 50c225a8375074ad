//! # watch-core
//!
//! Domain layer containing entities, value objects, repository traits, domain events,
//! and the playback sync math. This crate has zero dependencies on infrastructure
//! (database, transport, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod sync;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Room, RoomMember, RoomVisibility, SampleKind, SyncSample, generate_access_secret,
};
pub use error::DomainError;
pub use events::{EventEnvelope, RoomEvent};
pub use traits::{
    MemberRepository, RateLimitStore, RepoResult, RoomRepository, SampleRepository,
};
pub use value_objects::{MemberId, RoomId, RoomIdParseError, UserId, generate_room_token};

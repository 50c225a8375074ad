//! Domain entities - core business objects

mod member;
mod room;
mod sample;

pub use member::RoomMember;
pub use room::{Room, RoomVisibility, generate_access_secret};
pub use sample::{SampleKind, SyncSample};

//! Database models - SQLx-compatible structs for PostgreSQL tables

mod member;
mod room;
mod sample;

pub use member::RoomMemberModel;
pub use room::RoomModel;
pub use sample::SyncSampleModel;

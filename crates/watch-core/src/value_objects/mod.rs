//! Value objects - immutable types that represent domain concepts

mod member_id;
mod room_id;
mod user_id;

pub use member_id::MemberId;
pub use room_id::{RoomId, RoomIdParseError, generate_room_token};
pub use user_id::UserId;

//! Request fixtures for engine scenarios

use std::sync::atomic::{AtomicU64, Ordering};

use watch_core::entities::RoomVisibility;
use watch_core::value_objects::{MemberId, RoomId};
use watch_engine::commands::{
    CreateRoomRequest, HeartbeatRequest, JoinRoomRequest, PlaybackAction, PlaybackRequest,
};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Create-room request for a public room
pub fn create_room_request(user: &str) -> CreateRoomRequest {
    CreateRoomRequest {
        user_id: user.to_string(),
        display_name: user.to_string(),
        title: format!("Watch Party {}", unique_suffix()),
        media_ref: format!("media/{}", unique_suffix()),
        visibility: RoomVisibility::Public,
        access_secret: None,
    }
}

/// Create-room request for a private room, optionally with a chosen secret
pub fn private_room_request(user: &str, secret: Option<&str>) -> CreateRoomRequest {
    CreateRoomRequest {
        visibility: RoomVisibility::Private,
        access_secret: secret.map(str::to_string),
        ..create_room_request(user)
    }
}

/// Join request
pub fn join_request(room_id: &RoomId, user: &str, secret: Option<&str>) -> JoinRoomRequest {
    JoinRoomRequest {
        room_id: room_id.clone(),
        user_id: user.to_string(),
        display_name: user.to_string(),
        access_secret: secret.map(str::to_string),
    }
}

/// Seek command
pub fn seek(room_id: &RoomId, member_id: MemberId, position: f64) -> PlaybackRequest {
    PlaybackRequest {
        room_id: room_id.clone(),
        member_id,
        action: PlaybackAction::Seek,
        position_secs: Some(position),
        speed: None,
    }
}

/// Play command
pub fn play(room_id: &RoomId, member_id: MemberId) -> PlaybackRequest {
    PlaybackRequest {
        room_id: room_id.clone(),
        member_id,
        action: PlaybackAction::Play,
        position_secs: None,
        speed: None,
    }
}

/// Pause command
pub fn pause(room_id: &RoomId, member_id: MemberId) -> PlaybackRequest {
    PlaybackRequest {
        room_id: room_id.clone(),
        member_id,
        action: PlaybackAction::Pause,
        position_secs: None,
        speed: None,
    }
}

/// Heartbeat report
pub fn beat(room_id: &RoomId, member_id: MemberId, position: f64, playing: bool) -> HeartbeatRequest {
    HeartbeatRequest {
        room_id: room_id.clone(),
        member_id,
        position_secs: position,
        playing,
    }
}

//! Room entity <-> model mapper

use watch_core::entities::{Room, RoomVisibility};
use watch_core::error::DomainError;
use watch_core::traits::RepoResult;
use watch_core::value_objects::{MemberId, RoomId};

use crate::models::RoomModel;

/// Convert a RoomModel row into a Room entity
pub fn room_from_model(model: RoomModel) -> RepoResult<Room> {
    let id = RoomId::parse(&model.id)
        .map_err(|e| DomainError::Storage(format!("corrupt room id {:?}: {e}", model.id)))?;
    let visibility = model
        .visibility
        .parse::<RoomVisibility>()
        .map_err(DomainError::Storage)?;

    Ok(Room {
        id,
        title: model.title,
        media_ref: model.media_ref,
        visibility,
        access_secret: model.access_secret,
        position_secs: model.position_secs,
        playing: model.playing,
        speed: model.speed,
        host_id: model.host_id.map(MemberId::from_uuid),
        member_count: model.member_count.max(0) as u32,
        created_at: model.created_at,
        last_activity_at: model.last_activity_at,
        empty_since: model.empty_since,
    })
}

//! RoomMember entity <-> model mapper

use watch_core::entities::RoomMember;
use watch_core::error::DomainError;
use watch_core::traits::RepoResult;
use watch_core::value_objects::{MemberId, RoomId, UserId};

use crate::models::RoomMemberModel;

/// Convert a RoomMemberModel row into a RoomMember entity
pub fn member_from_model(model: RoomMemberModel) -> RepoResult<RoomMember> {
    let room_id = RoomId::parse(&model.room_id)
        .map_err(|e| DomainError::Storage(format!("corrupt room id {:?}: {e}", model.room_id)))?;

    Ok(RoomMember {
        id: MemberId::from_uuid(model.id),
        room_id,
        user_id: UserId::new(model.user_id),
        display_name: model.display_name,
        avatar: model.avatar,
        is_host: model.is_host,
        synced: model.synced,
        position_secs: model.position_secs,
        joined_at: model.joined_at,
        last_heartbeat_at: model.last_heartbeat_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_maps_valid_row() {
        let id = uuid::Uuid::new_v4();
        let member = member_from_model(RoomMemberModel {
            id,
            room_id: "aXk29QzD".to_string(),
            user_id: "user-7".to_string(),
            display_name: "Alice".to_string(),
            avatar: None,
            is_host: true,
            synced: true,
            position_secs: 12.0,
            joined_at: Utc::now(),
            last_heartbeat_at: Utc::now(),
        })
        .unwrap();

        assert_eq!(member.id, MemberId::from_uuid(id));
        assert_eq!(member.user_id.as_str(), "user-7");
        assert!(member.is_host);
    }
}

//! SyncSample entity <-> model mapper

use watch_core::entities::{SampleKind, SyncSample};
use watch_core::error::DomainError;
use watch_core::traits::RepoResult;
use watch_core::value_objects::{MemberId, RoomId};

use crate::models::SyncSampleModel;

/// Convert a SyncSampleModel row into a SyncSample entity
pub fn sample_from_model(model: SyncSampleModel) -> RepoResult<SyncSample> {
    let room_id = RoomId::parse(&model.room_id)
        .map_err(|e| DomainError::Storage(format!("corrupt room id {:?}: {e}", model.room_id)))?;
    let kind = model
        .kind
        .parse::<SampleKind>()
        .map_err(DomainError::Storage)?;

    Ok(SyncSample {
        id: model.id,
        room_id,
        member_id: MemberId::from_uuid(model.member_id),
        kind,
        host_position_secs: model.host_position_secs,
        member_position_secs: model.member_position_secs,
        drift_secs: model.drift_secs,
        synced: model.synced,
        recorded_at: model.recorded_at,
    })
}

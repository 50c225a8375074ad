//! Presence service
//!
//! Heartbeat ingestion and staleness queries. A heartbeat refreshes the
//! member's liveness, re-evaluates their drift against the room head, and
//! returns the authoritative playback state so the client can correct
//! itself without a second round trip.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, instrument};

use watch_core::entities::{RoomMember, SampleKind, SyncSample};
use watch_core::events::{MemberSyncStatusChangedEvent, RoomEvent};
use watch_core::sync;
use watch_core::value_objects::RoomId;

use crate::commands::{HeartbeatAck, HeartbeatRequest};
use crate::context::EngineContext;
use crate::EngineResult;

use super::playback::validate_position;
use super::room::RoomService;

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Ingest a member heartbeat
    ///
    /// A host heartbeat is the authority path: the reported position and
    /// play state become the room head. No `RoomStateChanged` event is
    /// emitted for that, and followers are not force-desynced; they
    /// correct themselves against the moving head on their own heartbeats.
    ///
    /// Sending the same heartbeat twice changes nothing but the liveness
    /// timestamp; sync events fire only on a transition of the flag.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, member_id = %request.member_id))]
    pub async fn heartbeat(&self, request: &HeartbeatRequest) -> EngineResult<HeartbeatAck> {
        validate_position(request.position_secs)?;

        let rooms = RoomService::new(self.ctx);
        let mut room = rooms.require_room(&request.room_id).await?;
        let mut member = rooms
            .require_member_in_room(&room, request.member_id)
            .await?;

        member.record_heartbeat(request.position_secs);

        if room.is_host(member.id) {
            room.apply_playback(request.position_secs, request.playing, room.speed);
            self.ctx.room_repo().update(&room).await?;
        }

        let eval = sync::evaluate(room.position_secs, member.position_secs);
        let changed = member.set_synced(eval.synced);
        self.ctx.member_repo().update(&member).await?;

        let sample = SyncSample::record(
            room.id.clone(),
            member.id,
            SampleKind::Heartbeat,
            room.position_secs,
            member.position_secs,
        );
        self.ctx.sample_repo().insert(&sample).await?;

        if changed {
            debug!(
                room_id = %room.id,
                member_id = %member.id,
                synced = member.synced,
                drift_secs = eval.drift_secs,
                "Sync status changed"
            );
            self.ctx.broadcaster().publish(
                &room.id,
                RoomEvent::MemberSyncStatusChanged(MemberSyncStatusChangedEvent::new(
                    room.id.clone(),
                    member.id,
                    member.synced,
                    eval.drift_secs,
                )),
            );
        }

        Ok(HeartbeatAck {
            drift_secs: eval.drift_secs,
            synced: member.synced,
            host_position_secs: room.position_secs,
            host_playing: room.playing,
            host_speed: room.speed,
        })
    }

    /// Members of a room whose last heartbeat predates the timeout
    pub async fn stale_members(&self, room_id: &RoomId) -> EngineResult<Vec<RoomMember>> {
        self.ctx
            .member_repo()
            .find_stale(room_id, self.stale_cutoff())
            .await
    }

    /// Rooms currently holding at least one stale member
    pub async fn rooms_with_stale_members(&self) -> EngineResult<Vec<RoomId>> {
        self.ctx
            .member_repo()
            .rooms_with_stale_members(self.stale_cutoff())
            .await
    }

    pub(crate) fn stale_cutoff(&self) -> DateTime<Utc> {
        Utc::now() - Duration::seconds(self.ctx.config().member_timeout.as_secs() as i64)
    }
}

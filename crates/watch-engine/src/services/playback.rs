//! Playback control service
//!
//! Host-driven mutation of a room's shared playback head. Every accepted
//! command triggers a bulk resync: each member gets a [`SyncSample`]
//! against the new head, and every non-host member is marked unsynced
//! until their next heartbeat proves otherwise.

use tracing::{info, instrument};

use watch_core::entities::{Room, SampleKind, SyncSample};
use watch_core::error::DomainError;
use watch_core::events::{MemberSyncStatusChangedEvent, RoomEvent, RoomStateChangedEvent};
use watch_core::sync;

use crate::commands::{PlaybackAction, PlaybackRequest, RoomSnapshot};
use crate::context::EngineContext;
use crate::EngineResult;

use super::room::RoomService;

/// Reject a position that is not a finite, non-negative time
pub(crate) fn validate_position(position_secs: f64) -> EngineResult<()> {
    if !position_secs.is_finite() || position_secs < 0.0 {
        return Err(DomainError::InvalidPosition(position_secs));
    }
    Ok(())
}

/// Reject a speed that is not a finite, positive multiplier
pub(crate) fn validate_speed(speed: f64) -> EngineResult<()> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(DomainError::InvalidSpeed(speed));
    }
    Ok(())
}

/// Playback control service
pub struct PlaybackService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> PlaybackService<'a> {
    /// Create a new PlaybackService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Apply a play, pause, or seek command to the room head
    ///
    /// Input validation runs before any lookup, so a malformed position is
    /// reported as such even when the caller would also fail the host
    /// check. Authority is then verified and the head mutated; nothing is
    /// written on a rejected command.
    #[instrument(skip(self, request), fields(room_id = %request.room_id, member_id = %request.member_id, action = ?request.action))]
    pub async fn control(&self, request: &PlaybackRequest) -> EngineResult<RoomSnapshot> {
        if let Some(position) = request.position_secs {
            validate_position(position)?;
        }
        if let Some(speed) = request.speed {
            validate_speed(speed)?;
        }
        if request.action == PlaybackAction::Seek && request.position_secs.is_none() {
            return Err(DomainError::Validation(
                "seek requires a position".to_string(),
            ));
        }

        let rooms = RoomService::new(self.ctx);
        let mut room = rooms.require_room(&request.room_id).await?;
        let member = rooms
            .require_member_in_room(&room, request.member_id)
            .await?;
        if !room.is_host(member.id) {
            return Err(DomainError::NotHost);
        }

        let position = request.position_secs.unwrap_or(room.position_secs);
        let speed = request.speed.unwrap_or(room.speed);
        let playing = match request.action {
            PlaybackAction::Play => true,
            PlaybackAction::Pause => false,
            PlaybackAction::Seek => room.playing,
        };
        let kind = match request.action {
            PlaybackAction::Seek => SampleKind::Seek,
            PlaybackAction::Play | PlaybackAction::Pause => SampleKind::PlayPause,
        };

        room.apply_playback(position, playing, speed);
        self.ctx.room_repo().update(&room).await?;

        info!(
            room_id = %room.id,
            position_secs = room.position_secs,
            playing = room.playing,
            speed = room.speed,
            "Playback head updated"
        );

        self.ctx.broadcaster().publish(
            &room.id,
            RoomEvent::RoomStateChanged(RoomStateChangedEvent::new(
                room.id.clone(),
                room.position_secs,
                room.playing,
                room.speed,
                room.host_id,
            )),
        );

        self.bulk_resync(&room, kind).await?;

        Ok(RoomSnapshot::from(&room))
    }

    /// Re-evaluate every member against the new head
    ///
    /// The host keeps its computed standing; everyone else is marked
    /// unsynced regardless of drift. Their player has not reacted to the
    /// command yet, and the next heartbeat corrects the flag from a real
    /// report instead of a guess.
    async fn bulk_resync(&self, room: &Room, kind: SampleKind) -> EngineResult<()> {
        let members = self.ctx.member_repo().list_by_room(&room.id).await?;
        for mut member in members {
            let eval = sync::evaluate(room.position_secs, member.position_secs);

            let sample = SyncSample::record(
                room.id.clone(),
                member.id,
                kind,
                room.position_secs,
                member.position_secs,
            );
            self.ctx.sample_repo().insert(&sample).await?;

            let target = if member.is_host { eval.synced } else { false };
            if member.set_synced(target) {
                self.ctx.member_repo().update(&member).await?;
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
        }
        Ok(())
    }
}

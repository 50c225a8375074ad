//! Room lifecycle service
//!
//! Creation, membership, deletion, and the reads built on them. The
//! removal path in [`RoomService::remove_member`] is shared between
//! explicit leaves and timeout eviction so both produce identical state
//! transitions and events, host failover included.

use tracing::{info, instrument};
use validator::Validate;

use watch_core::entities::{Room, RoomMember, SampleKind, SyncSample};
use watch_core::error::DomainError;
use watch_core::events::{HostChangedEvent, MemberJoinedEvent, MemberLeftEvent, RoomEvent};
use watch_core::sync;
use watch_core::value_objects::{MemberId, RoomId, UserId};

use crate::commands::{
    CreateRoomRequest, CreatedRoom, DeleteRoomRequest, HostStateView, JoinRoomRequest,
    LeaveOutcome, LeaveRoomRequest, MemberSummary, RoomSnapshot, UpdateProfileRequest,
};
use crate::context::EngineContext;
use crate::EngineResult;

use super::validation_error;

/// Attempts at minting an unused room token before giving up
const MAX_TOKEN_ATTEMPTS: usize = 8;

/// Room lifecycle service
pub struct RoomService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> RoomService<'a> {
    /// Create a new RoomService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Mint a room token that no existing room uses.
    /// Collisions are exceedingly rare but checked, not assumed away.
    pub async fn allocate_room_id(&self) -> EngineResult<RoomId> {
        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let id = RoomId::generate();
            if self.ctx.room_repo().find_by_id(&id).await?.is_none() {
                return Ok(id);
            }
        }
        Err(DomainError::Storage(
            "could not allocate an unused room token".to_string(),
        ))
    }

    /// Create a room with the creator joined as host
    #[instrument(skip(self, request), fields(room_id = %room_id, user_id = %request.user_id))]
    pub async fn create_room(
        &self,
        room_id: RoomId,
        request: CreateRoomRequest,
    ) -> EngineResult<CreatedRoom> {
        request.validate().map_err(|e| validation_error(&e))?;

        let mut room = Room::new(
            room_id,
            request.title,
            request.media_ref,
            request.visibility,
            request.access_secret,
        );
        self.ctx.room_repo().create(&room).await?;

        let host = RoomMember::new(
            room.id.clone(),
            UserId::new(request.user_id),
            request.display_name,
            true,
        );
        self.ctx.member_repo().insert(&host).await?;

        room.set_host(host.id);
        room.member_count = 1;
        self.ctx.room_repo().update(&room).await?;

        let sample = SyncSample::record(
            room.id.clone(),
            host.id,
            SampleKind::Join,
            room.position_secs,
            host.position_secs,
        );
        self.ctx.sample_repo().insert(&sample).await?;

        info!(room_id = %room.id, host_id = %host.id, visibility = room.visibility.as_str(), "Room created");

        self.publish_joined(&room, &host);
        self.publish_host_changed(&room, None, Some(host.id));

        // The one place a generated secret is handed back
        let access_secret = room.access_secret.clone();
        Ok(CreatedRoom {
            room: RoomSnapshot::from(&room),
            host: MemberSummary::from(&host),
            access_secret,
        })
    }

    /// Join an existing room
    #[instrument(skip(self, request), fields(room_id = %request.room_id, user_id = %request.user_id))]
    pub async fn join_room(&self, request: JoinRoomRequest) -> EngineResult<MemberSummary> {
        request.validate().map_err(|e| validation_error(&e))?;

        let mut room = self.require_room(&request.room_id).await?;

        // Access control precedes the duplicate check: a bad secret must
        // not reveal whether the user is already inside
        if !room.verify_secret(request.access_secret.as_deref()) {
            return Err(DomainError::AccessDenied);
        }

        let user_id = UserId::new(request.user_id);
        if self
            .ctx
            .member_repo()
            .find_by_room_and_user(&room.id, &user_id)
            .await?
            .is_some()
        {
            return Err(DomainError::AlreadyJoined);
        }

        let becomes_host = room.member_count == 0;
        let member = RoomMember::new(
            room.id.clone(),
            user_id,
            request.display_name,
            becomes_host,
        );
        self.ctx.member_repo().insert(&member).await?;

        if becomes_host {
            room.set_host(member.id);
        }
        room.member_count += 1;
        room.mark_occupied();
        room.touch();
        self.ctx.room_repo().update(&room).await?;

        let sample = SyncSample::record(
            room.id.clone(),
            member.id,
            SampleKind::Join,
            room.position_secs,
            member.position_secs,
        );
        self.ctx.sample_repo().insert(&sample).await?;

        info!(room_id = %room.id, member_id = %member.id, is_host = becomes_host, "Member joined");

        self.publish_joined(&room, &member);
        if becomes_host {
            self.publish_host_changed(&room, None, Some(member.id));
        }

        Ok(MemberSummary::from(&member))
    }

    /// Leave a room
    #[instrument(skip(self, request), fields(room_id = %request.room_id, member_id = %request.member_id))]
    pub async fn leave_room(&self, request: &LeaveRoomRequest) -> EngineResult<LeaveOutcome> {
        let mut room = self.require_room(&request.room_id).await?;
        let member = self.require_member_in_room(&room, request.member_id).await?;

        let outcome = self.remove_member(&mut room, &member).await?;
        info!(room_id = %room.id, member_id = %member.id, was_host = outcome.was_host, "Member left");
        Ok(outcome)
    }

    /// Remove a member from a room: the shared path behind explicit
    /// leaves and timeout eviction.
    ///
    /// The departing host's replacement is installed in the same pass, so
    /// no caller ever observes a non-empty room without a host. Promotion
    /// order is earliest join first, ties broken by smallest member id.
    pub(crate) async fn remove_member(
        &self,
        room: &mut Room,
        member: &RoomMember,
    ) -> EngineResult<LeaveOutcome> {
        let was_host = room.is_host(member.id);

        self.ctx.member_repo().delete(member.id).await?;
        room.member_count = room.member_count.saturating_sub(1);

        let sample = SyncSample::record(
            room.id.clone(),
            member.id,
            SampleKind::Leave,
            room.position_secs,
            member.position_secs,
        );
        self.ctx.sample_repo().insert(&sample).await?;

        let mut new_host = None;
        if room.member_count == 0 {
            room.clear_host();
            room.mark_empty();
        } else if was_host {
            new_host = Some(self.promote_successor(room).await?);
        }
        room.touch();
        self.ctx.room_repo().update(room).await?;

        self.ctx.broadcaster().publish(
            &room.id,
            RoomEvent::MemberLeft(MemberLeftEvent::new(
                room.id.clone(),
                member.id,
                member.user_id.clone(),
                was_host,
            )),
        );
        if was_host {
            self.publish_host_changed(room, Some(member.id), new_host);
        }

        Ok(LeaveOutcome { was_host, new_host })
    }

    /// Delete a room along with its members, samples, and channel
    #[instrument(skip(self, request), fields(room_id = %request.room_id, member_id = %request.member_id))]
    pub async fn delete_room(&self, request: &DeleteRoomRequest) -> EngineResult<()> {
        let room = self.require_room(&request.room_id).await?;
        let member = self.require_member_in_room(&room, request.member_id).await?;
        if !room.is_host(member.id) {
            return Err(DomainError::NotHost);
        }

        self.ctx.member_repo().delete_by_room(&room.id).await?;
        self.ctx.sample_repo().delete_by_room(&room.id).await?;
        self.ctx.room_repo().delete(&room.id).await?;
        self.ctx.broadcaster().close_room(&room.id);

        info!(room_id = %room.id, host_id = %member.id, "Room deleted");
        Ok(())
    }

    /// Update a member's profile; absent fields stay unchanged
    #[instrument(skip(self, request), fields(room_id = %request.room_id, member_id = %request.member_id))]
    pub async fn update_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> EngineResult<MemberSummary> {
        request.validate().map_err(|e| validation_error(&e))?;

        let room = self.require_room(&request.room_id).await?;
        let mut member = self.require_member_in_room(&room, request.member_id).await?;

        if let Some(display_name) = request.display_name {
            member.set_display_name(display_name);
        }
        if let Some(avatar) = request.avatar {
            member.set_avatar(Some(avatar));
        }
        self.ctx.member_repo().update(&member).await?;

        Ok(MemberSummary::from(&member))
    }

    /// Authoritative playback head plus the caller's sync standing
    #[instrument(skip(self))]
    pub async fn host_state(
        &self,
        room_id: &RoomId,
        member_id: MemberId,
    ) -> EngineResult<HostStateView> {
        let room = self.require_room(room_id).await?;
        let member = self.require_member_in_room(&room, member_id).await?;

        let eval = sync::evaluate(room.position_secs, member.position_secs);
        Ok(HostStateView {
            room: RoomSnapshot::from(&room),
            caller_synced: member.synced,
            caller_drift_secs: eval.drift_secs,
        })
    }

    /// Public view of a room
    pub async fn snapshot(&self, room_id: &RoomId) -> EngineResult<RoomSnapshot> {
        Ok(RoomSnapshot::from(&self.require_room(room_id).await?))
    }

    /// Public rooms, most recently active first
    pub async fn list_public(&self) -> EngineResult<Vec<RoomSnapshot>> {
        let rooms = self.ctx.room_repo().list_public().await?;
        Ok(rooms.iter().map(RoomSnapshot::from).collect())
    }

    // === Shared lookups ===

    pub(crate) async fn require_room(&self, room_id: &RoomId) -> EngineResult<Room> {
        self.ctx
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| DomainError::RoomNotFound(room_id.clone()))
    }

    pub(crate) async fn require_member_in_room(
        &self,
        room: &Room,
        member_id: MemberId,
    ) -> EngineResult<RoomMember> {
        let member = self
            .ctx
            .member_repo()
            .find_by_id(member_id)
            .await?
            .ok_or(DomainError::MemberNotFound(member_id))?;
        if member.room_id != room.id {
            return Err(DomainError::NotInRoom);
        }
        Ok(member)
    }

    // === Internals ===

    async fn promote_successor(&self, room: &mut Room) -> EngineResult<MemberId> {
        let members = self.ctx.member_repo().list_by_room(&room.id).await?;
        let mut successor = members.into_iter().next().ok_or_else(|| {
            DomainError::Storage("roster empty during host promotion".to_string())
        })?;

        successor.promote();
        self.ctx.member_repo().update(&successor).await?;
        room.set_host(successor.id);

        info!(room_id = %room.id, new_host = %successor.id, "Host promoted");
        Ok(successor.id)
    }

    fn publish_joined(&self, room: &Room, member: &RoomMember) {
        self.ctx.broadcaster().publish(
            &room.id,
            RoomEvent::MemberJoined(MemberJoinedEvent::new(
                room.id.clone(),
                member.id,
                member.user_id.clone(),
                member.display_name.clone(),
                member.is_host,
            )),
        );
    }

    fn publish_host_changed(
        &self,
        room: &Room,
        previous_host: Option<MemberId>,
        new_host: Option<MemberId>,
    ) {
        self.ctx.broadcaster().publish(
            &room.id,
            RoomEvent::HostChanged(HostChangedEvent::new(
                room.id.clone(),
                previous_host,
                new_host,
            )),
        );
    }
}

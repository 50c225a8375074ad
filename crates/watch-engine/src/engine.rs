//! Room engine facade
//!
//! The transport-facing surface: every command a client can issue comes
//! through here. Commands for one room serialize on that room's lock;
//! commands for different rooms interleave freely. Lock acquisition is
//! bounded by `command_timeout`, and a command that times out waiting has
//! touched nothing. Once the lock is held the command runs to completion,
//! publishing its events before the lock is released.

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::OwnedMutexGuard;

use watch_core::error::DomainError;
use watch_core::events::EventEnvelope;
use watch_core::value_objects::{MemberId, RoomId, UserId};

use crate::commands::{
    CreateRoomRequest, CreatedRoom, DeleteRoomRequest, HeartbeatAck, HeartbeatRequest,
    HostStateView, JoinRoomRequest, LeaveOutcome, LeaveRoomRequest, MemberSummary,
    PlaybackRequest, RoomSnapshot, UpdateProfileRequest,
};
use crate::context::EngineContext;
use crate::limiter::ActionKind;
use crate::services::{PlaybackService, PresenceService, RoomService};
use crate::EngineResult;

/// Transport-agnostic room engine
pub struct RoomEngine {
    ctx: Arc<EngineContext>,
}

impl RoomEngine {
    /// Create an engine over a shared context
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// The shared engine context (for wiring a sweeper or adapters)
    pub fn context(&self) -> &Arc<EngineContext> {
        &self.ctx
    }

    /// Acquire a room's command lock within the configured timeout
    async fn acquire(
        &self,
        room_id: &RoomId,
        command: &'static str,
    ) -> EngineResult<OwnedMutexGuard<()>> {
        let lock = self.ctx.room_lock(room_id);
        tokio::time::timeout(self.ctx.config().command_timeout, lock.lock_owned())
            .await
            .map_err(|_| DomainError::Timeout(command))
    }

    /// Rate-limit keys are per user; memberships only carry the member id,
    /// so the user is resolved before the lock and the membership re-read
    /// under it.
    async fn resolve_user(&self, member_id: MemberId) -> EngineResult<UserId> {
        let member = self
            .ctx
            .member_repo()
            .find_by_id(member_id)
            .await?
            .ok_or(DomainError::MemberNotFound(member_id))?;
        Ok(member.user_id)
    }

    // === Commands ===

    /// Create a room with the caller as host
    pub async fn create_room(&self, request: CreateRoomRequest) -> EngineResult<CreatedRoom> {
        self.ctx
            .limiter()
            .check(&UserId::new(request.user_id.as_str()), ActionKind::RoomCreate)
            .await?;

        let service = RoomService::new(&self.ctx);
        let room_id = service.allocate_room_id().await?;
        let _guard = self.acquire(&room_id, "create_room").await?;
        service.create_room(room_id, request).await
    }

    /// Join an existing room
    pub async fn join_room(&self, request: JoinRoomRequest) -> EngineResult<MemberSummary> {
        self.ctx
            .limiter()
            .check(
                &UserId::new(request.user_id.as_str()),
                ActionKind::RoomMembership,
            )
            .await?;

        let _guard = self.acquire(&request.room_id, "join_room").await?;
        RoomService::new(&self.ctx).join_room(request).await
    }

    /// Leave a room
    pub async fn leave_room(&self, request: LeaveRoomRequest) -> EngineResult<LeaveOutcome> {
        let user_id = self.resolve_user(request.member_id).await?;
        self.ctx
            .limiter()
            .check(&user_id, ActionKind::RoomMembership)
            .await?;

        let _guard = self.acquire(&request.room_id, "leave_room").await?;
        RoomService::new(&self.ctx).leave_room(&request).await
    }

    /// Delete a room (host only)
    pub async fn delete_room(&self, request: DeleteRoomRequest) -> EngineResult<()> {
        let _guard = self.acquire(&request.room_id, "delete_room").await?;
        RoomService::new(&self.ctx).delete_room(&request).await?;
        self.ctx.remove_room_lock(&request.room_id);
        Ok(())
    }

    /// Apply a play, pause, or seek command (host only)
    pub async fn control_playback(&self, request: PlaybackRequest) -> EngineResult<RoomSnapshot> {
        let user_id = self.resolve_user(request.member_id).await?;
        self.ctx
            .limiter()
            .check(&user_id, ActionKind::PlaybackControl)
            .await?;

        let _guard = self.acquire(&request.room_id, "control_playback").await?;
        PlaybackService::new(&self.ctx).control(&request).await
    }

    /// Ingest a member heartbeat. Heartbeats are not rate-limited.
    pub async fn heartbeat(&self, request: HeartbeatRequest) -> EngineResult<HeartbeatAck> {
        let _guard = self.acquire(&request.room_id, "heartbeat").await?;
        PresenceService::new(&self.ctx).heartbeat(&request).await
    }

    /// Authoritative playback head plus the caller's sync standing
    pub async fn get_host_state(
        &self,
        room_id: &RoomId,
        member_id: MemberId,
    ) -> EngineResult<HostStateView> {
        let _guard = self.acquire(room_id, "get_host_state").await?;
        RoomService::new(&self.ctx)
            .host_state(room_id, member_id)
            .await
    }

    /// Update a member's display name or avatar
    pub async fn update_member_profile(
        &self,
        request: UpdateProfileRequest,
    ) -> EngineResult<MemberSummary> {
        let _guard = self.acquire(&request.room_id, "update_member_profile").await?;
        RoomService::new(&self.ctx).update_profile(request).await
    }

    // === Reads & plumbing ===

    /// Public view of a room
    pub async fn room_snapshot(&self, room_id: &RoomId) -> EngineResult<RoomSnapshot> {
        let _guard = self.acquire(room_id, "room_snapshot").await?;
        RoomService::new(&self.ctx).snapshot(room_id).await
    }

    /// Public rooms, most recently active first
    pub async fn list_public_rooms(&self) -> EngineResult<Vec<RoomSnapshot>> {
        RoomService::new(&self.ctx).list_public().await
    }

    /// Gate an action through the shared limiter. Lets co-located features
    /// (comment creation, for one) use the same buckets and fail-open rule.
    pub async fn check_rate(&self, user_id: &UserId, kind: ActionKind) -> EngineResult<()> {
        self.ctx.limiter().check(user_id, kind).await
    }

    /// Subscribe to a room's ordered event stream
    pub fn subscribe(&self, room_id: &RoomId) -> broadcast::Receiver<EventEnvelope> {
        self.ctx.broadcaster().subscribe(room_id)
    }
}

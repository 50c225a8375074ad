//! Test harness for engine scenarios
//!
//! Builds an engine over the in-memory stores and exposes the direct
//! repository access the scenarios need: backdating timestamps to
//! simulate elapsed time and reading entities back for assertions.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};

use watch_core::entities::{Room, RoomMember};
use watch_core::traits::{MemberRepository, RoomRepository};
use watch_core::value_objects::{MemberId, RoomId};
use watch_engine::commands::{CreatedRoom, MemberSummary};
use watch_engine::{
    EngineConfig, EngineContext, EngineContextBuilder, EvictionScheduler, RoomEngine,
};
use watch_store::{
    MemoryMemberRepository, MemoryRateLimitStore, MemoryRoomRepository, MemorySampleRepository,
};

use crate::fixtures;

/// An engine over in-memory stores, plus handles for test manipulation
pub struct TestEngine {
    pub engine: Arc<RoomEngine>,
    rate_store: Arc<MemoryRateLimitStore>,
}

impl TestEngine {
    /// Build an engine with default configuration
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Build an engine with custom configuration
    pub fn with_config(config: EngineConfig) -> Self {
        // First caller installs the subscriber; later calls are no-ops
        let _ = watch_common::try_init_tracing();

        let rate_store = Arc::new(MemoryRateLimitStore::new());
        let ctx = EngineContextBuilder::new()
            .room_repo(Arc::new(MemoryRoomRepository::new()))
            .member_repo(Arc::new(MemoryMemberRepository::new()))
            .sample_repo(Arc::new(MemorySampleRepository::new()))
            .rate_limit_store(rate_store.clone())
            .config(config)
            .build()
            .expect("all dependencies provided");

        Self {
            engine: Arc::new(RoomEngine::new(Arc::new(ctx))),
            rate_store,
        }
    }

    /// The engine's shared context
    pub fn ctx(&self) -> &Arc<EngineContext> {
        self.engine.context()
    }

    /// A sweeper over the same context
    pub fn sweeper(&self) -> EvictionScheduler {
        EvictionScheduler::new(self.ctx().clone())
    }

    /// Simulate the rate-limit store going down (or recovering)
    pub fn set_rate_store_failing(&self, failing: bool) {
        self.rate_store.set_failing(failing);
    }

    // === Shorthand commands ===

    /// Create a public room hosted by `user`
    pub async fn host_room(&self, user: &str) -> Result<CreatedRoom> {
        Ok(self
            .engine
            .create_room(fixtures::create_room_request(user))
            .await?)
    }

    /// Join `user` into a public room
    pub async fn join(&self, room_id: &RoomId, user: &str) -> Result<MemberSummary> {
        Ok(self
            .engine
            .join_room(fixtures::join_request(room_id, user, None))
            .await?)
    }

    // === Direct state access ===

    /// Read a room back from the store
    pub async fn room(&self, room_id: &RoomId) -> Result<Room> {
        self.ctx()
            .room_repo()
            .find_by_id(room_id)
            .await?
            .ok_or_else(|| anyhow!("room {room_id} not found"))
    }

    /// Read a member back from the store
    pub async fn member(&self, member_id: MemberId) -> Result<RoomMember> {
        self.ctx()
            .member_repo()
            .find_by_id(member_id)
            .await?
            .ok_or_else(|| anyhow!("member {member_id} not found"))
    }

    /// Push a member's last heartbeat into the past
    pub async fn backdate_heartbeat(&self, member_id: MemberId, seconds: i64) -> Result<()> {
        let mut member = self.member(member_id).await?;
        member.last_heartbeat_at = Utc::now() - Duration::seconds(seconds);
        self.ctx().member_repo().update(&member).await?;
        Ok(())
    }

    /// Push a room's empty-since marker into the past
    pub async fn backdate_empty_since(&self, room_id: &RoomId, seconds: i64) -> Result<()> {
        let mut room = self.room(room_id).await?;
        room.empty_since = Some(Utc::now() - Duration::seconds(seconds));
        self.ctx().room_repo().update(&room).await?;
        Ok(())
    }
}

impl Default for TestEngine {
    fn default() -> Self {
        Self::new()
    }
}

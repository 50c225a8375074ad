//! Engine context - dependency container for the room engine
//!
//! Holds the repositories, the broadcaster, the rate limiter, the
//! configuration, and the per-room lock registry. Handed around as
//! `Arc<EngineContext>`; services borrow it.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use watch_core::error::DomainError;
use watch_core::traits::{MemberRepository, RateLimitStore, RoomRepository, SampleRepository};
use watch_core::value_objects::RoomId;

use crate::broadcast::Broadcaster;
use crate::config::EngineConfig;
use crate::limiter::RateLimiter;

/// Engine context containing all dependencies
///
/// Per-room state is the unit of mutual exclusion: every mutating command
/// for a room runs under that room's lock from the registry, and commands
/// for different rooms interleave freely. There is no global lock.
pub struct EngineContext {
    room_repo: Arc<dyn RoomRepository>,
    member_repo: Arc<dyn MemberRepository>,
    sample_repo: Arc<dyn SampleRepository>,
    broadcaster: Broadcaster,
    limiter: RateLimiter,
    config: EngineConfig,
    room_locks: DashMap<RoomId, Arc<Mutex<()>>>,
}

impl EngineContext {
    /// Create a new engine context with all dependencies
    pub fn new(
        room_repo: Arc<dyn RoomRepository>,
        member_repo: Arc<dyn MemberRepository>,
        sample_repo: Arc<dyn SampleRepository>,
        rate_limit_store: Arc<dyn RateLimitStore>,
        config: EngineConfig,
    ) -> Self {
        let broadcaster = Broadcaster::new(config.event_buffer);
        let limiter = RateLimiter::new(rate_limit_store, &config);

        Self {
            room_repo,
            member_repo,
            sample_repo,
            broadcaster,
            limiter,
            config,
            room_locks: DashMap::new(),
        }
    }

    // === Repositories ===

    /// Get the room repository
    pub fn room_repo(&self) -> &dyn RoomRepository {
        self.room_repo.as_ref()
    }

    /// Get the member repository
    pub fn member_repo(&self) -> &dyn MemberRepository {
        self.member_repo.as_ref()
    }

    /// Get the sample repository
    pub fn sample_repo(&self) -> &dyn SampleRepository {
        self.sample_repo.as_ref()
    }

    // === Components ===

    /// Get the event broadcaster
    pub fn broadcaster(&self) -> &Broadcaster {
        &self.broadcaster
    }

    /// Get the rate limiter
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Get the engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // === Room locks ===

    /// Get (creating on demand) the lock serializing a room's commands
    pub fn room_lock(&self, room_id: &RoomId) -> Arc<Mutex<()>> {
        self.room_locks
            .entry(room_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop a deleted room's lock. Holders keep their Arc; later commands
    /// for the token mint a fresh lock and then find the room gone.
    pub fn remove_room_lock(&self, room_id: &RoomId) {
        self.room_locks.remove(room_id);
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("repositories", &"...")
            .field("limiter", &self.limiter)
            .field("config", &self.config)
            .field("room_locks", &self.room_locks.len())
            .finish()
    }
}

/// Builder for creating an EngineContext with custom configuration
#[derive(Default)]
pub struct EngineContextBuilder {
    room_repo: Option<Arc<dyn RoomRepository>>,
    member_repo: Option<Arc<dyn MemberRepository>>,
    sample_repo: Option<Arc<dyn SampleRepository>>,
    rate_limit_store: Option<Arc<dyn RateLimitStore>>,
    config: Option<EngineConfig>,
}

impl EngineContextBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn room_repo(mut self, repo: Arc<dyn RoomRepository>) -> Self {
        self.room_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn member_repo(mut self, repo: Arc<dyn MemberRepository>) -> Self {
        self.member_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn sample_repo(mut self, repo: Arc<dyn SampleRepository>) -> Self {
        self.sample_repo = Some(repo);
        self
    }

    #[must_use]
    pub fn rate_limit_store(mut self, store: Arc<dyn RateLimitStore>) -> Self {
        self.rate_limit_store = Some(store);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the EngineContext
    ///
    /// # Errors
    /// Returns `DomainError::Validation` if any required dependency is missing
    pub fn build(self) -> Result<EngineContext, DomainError> {
        Ok(EngineContext::new(
            self.room_repo
                .ok_or_else(|| DomainError::Validation("room_repo is required".to_string()))?,
            self.member_repo
                .ok_or_else(|| DomainError::Validation("member_repo is required".to_string()))?,
            self.sample_repo
                .ok_or_else(|| DomainError::Validation("sample_repo is required".to_string()))?,
            self.rate_limit_store
                .ok_or_else(|| DomainError::Validation("rate_limit_store is required".to_string()))?,
            self.config.unwrap_or_default(),
        ))
    }
}

//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. The engine is handed trait objects, so a
//! Postgres-backed deployment and an in-memory test harness run the same
//! code paths.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::entities::{Room, RoomMember, SyncSample};
use crate::error::DomainError;
use crate::value_objects::{MemberId, RoomId, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Room Repository
// ============================================================================

#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Create a new room
    async fn create(&self, room: &Room) -> RepoResult<()>;

    /// Find room by ID
    async fn find_by_id(&self, id: &RoomId) -> RepoResult<Option<Room>>;

    /// Update an existing room (full row)
    async fn update(&self, room: &Room) -> RepoResult<()>;

    /// Delete a room
    async fn delete(&self, id: &RoomId) -> RepoResult<()>;

    /// List public rooms, most recently active first
    async fn list_public(&self) -> RepoResult<Vec<Room>>;

    /// List rooms whose roster emptied before the cutoff
    async fn find_empty_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Room>>;

    /// Total number of rooms
    async fn count(&self) -> RepoResult<i64>;
}

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Insert a new membership
    async fn insert(&self, member: &RoomMember) -> RepoResult<()>;

    /// Find member by ID
    async fn find_by_id(&self, id: MemberId) -> RepoResult<Option<RoomMember>>;

    /// Find a user's membership in a room
    async fn find_by_room_and_user(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> RepoResult<Option<RoomMember>>;

    /// List a room's members in promotion order:
    /// earliest `joined_at` first, ties broken by smallest member ID.
    /// Host failover depends on this ordering.
    async fn list_by_room(&self, room_id: &RoomId) -> RepoResult<Vec<RoomMember>>;

    /// Update an existing membership (full row)
    async fn update(&self, member: &RoomMember) -> RepoResult<()>;

    /// Delete a membership
    async fn delete(&self, id: MemberId) -> RepoResult<()>;

    /// Delete all memberships of a room. Returns the number removed.
    async fn delete_by_room(&self, room_id: &RoomId) -> RepoResult<u64>;

    /// List members of a room whose last heartbeat predates the cutoff
    async fn find_stale(
        &self,
        room_id: &RoomId,
        cutoff: DateTime<Utc>,
    ) -> RepoResult<Vec<RoomMember>>;

    /// List rooms that currently hold at least one stale member
    async fn rooms_with_stale_members(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<RoomId>>;

    /// Number of members in a room
    async fn count_by_room(&self, room_id: &RoomId) -> RepoResult<i64>;
}

// ============================================================================
// Sample Repository
// ============================================================================

#[async_trait]
pub trait SampleRepository: Send + Sync {
    /// Persist a sample. Returns the store-assigned ID.
    async fn insert(&self, sample: &SyncSample) -> RepoResult<i64>;

    /// List the most recent samples for a room, newest first
    async fn list_recent(&self, room_id: &RoomId, limit: i64) -> RepoResult<Vec<SyncSample>>;

    /// Drop all samples of a room. Returns the number removed.
    async fn delete_by_room(&self, room_id: &RoomId) -> RepoResult<u64>;

    /// Purge samples recorded before the cutoff. Returns the number removed.
    async fn delete_recorded_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64>;
}

// ============================================================================
// Rate Limit Store
// ============================================================================

/// Sliding-window event counter keyed by an opaque bucket string.
///
/// `acquire` admits the attempt iff fewer than `limit` events fall inside
/// the window ending now; only admitted attempts are recorded, so a denied
/// caller does not keep extending its own lockout. A failing store returns
/// `Err(DomainError::Storage)`; the limiter treats that as "allow" so a
/// degraded store never blocks commands.
#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Record one event if the bucket is under `limit` within the window.
    /// Returns whether the event was admitted.
    async fn acquire(&self, key: &str, window: Duration, limit: u32) -> RepoResult<bool>;
}

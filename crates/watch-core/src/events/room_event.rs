//! Room events - emitted when room state changes
//!
//! These events are handed to the broadcast dispatcher, which stamps them
//! with a per-room sequence number and fans them out to subscribers. The
//! engine emits them while still holding the room lock, so sequence order
//! matches state-transition order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, RoomId, UserId};

/// All possible room events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomEvent {
    // =========================================================================
    // Playback Events
    // =========================================================================
    RoomStateChanged(RoomStateChangedEvent),

    // =========================================================================
    // Membership Events
    // =========================================================================
    MemberJoined(MemberJoinedEvent),
    MemberLeft(MemberLeftEvent),
    HostChanged(HostChangedEvent),

    // =========================================================================
    // Sync Events
    // =========================================================================
    MemberSyncStatusChanged(MemberSyncStatusChangedEvent),
}

impl RoomEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RoomStateChanged(_) => "ROOM_STATE_CHANGED",
            Self::MemberJoined(_) => "MEMBER_JOINED",
            Self::MemberLeft(_) => "MEMBER_LEFT",
            Self::HostChanged(_) => "HOST_CHANGED",
            Self::MemberSyncStatusChanged(_) => "MEMBER_SYNC_STATUS_CHANGED",
        }
    }

    /// Get the room this event belongs to
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::RoomStateChanged(e) => &e.room_id,
            Self::MemberJoined(e) => &e.room_id,
            Self::MemberLeft(e) => &e.room_id,
            Self::HostChanged(e) => &e.room_id,
            Self::MemberSyncStatusChanged(e) => &e.room_id,
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::RoomStateChanged(e) => e.timestamp,
            Self::MemberJoined(e) => e.timestamp,
            Self::MemberLeft(e) => e.timestamp,
            Self::HostChanged(e) => e.timestamp,
            Self::MemberSyncStatusChanged(e) => e.timestamp,
        }
    }
}

/// Broadcast wrapper carrying the per-room sequence number
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Strictly increasing per room; the first event in a room is 1
    pub seq: u64,
    pub room_id: RoomId,
    pub event: RoomEvent,
}

impl EventEnvelope {
    pub fn new(seq: u64, room_id: RoomId, event: RoomEvent) -> Self {
        Self {
            seq,
            room_id,
            event,
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomStateChangedEvent {
    pub room_id: RoomId,
    pub position_secs: f64,
    pub playing: bool,
    pub speed: f64,
    pub host_id: Option<MemberId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberJoinedEvent {
    pub room_id: RoomId,
    pub member_id: MemberId,
    pub user_id: UserId,
    pub display_name: String,
    pub is_host: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLeftEvent {
    pub room_id: RoomId,
    pub member_id: MemberId,
    pub user_id: UserId,
    pub was_host: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostChangedEvent {
    pub room_id: RoomId,
    pub previous_host: Option<MemberId>,
    pub new_host: Option<MemberId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberSyncStatusChangedEvent {
    pub room_id: RoomId,
    pub member_id: MemberId,
    pub synced: bool,
    pub drift_secs: f64,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Creation Helpers
// ============================================================================

impl RoomStateChangedEvent {
    pub fn new(
        room_id: RoomId,
        position_secs: f64,
        playing: bool,
        speed: f64,
        host_id: Option<MemberId>,
    ) -> Self {
        Self {
            room_id,
            position_secs,
            playing,
            speed,
            host_id,
            timestamp: Utc::now(),
        }
    }
}

impl MemberJoinedEvent {
    pub fn new(
        room_id: RoomId,
        member_id: MemberId,
        user_id: UserId,
        display_name: String,
        is_host: bool,
    ) -> Self {
        Self {
            room_id,
            member_id,
            user_id,
            display_name,
            is_host,
            timestamp: Utc::now(),
        }
    }
}

impl MemberLeftEvent {
    pub fn new(room_id: RoomId, member_id: MemberId, user_id: UserId, was_host: bool) -> Self {
        Self {
            room_id,
            member_id,
            user_id,
            was_host,
            timestamp: Utc::now(),
        }
    }
}

impl HostChangedEvent {
    pub fn new(
        room_id: RoomId,
        previous_host: Option<MemberId>,
        new_host: Option<MemberId>,
    ) -> Self {
        Self {
            room_id,
            previous_host,
            new_host,
            timestamp: Utc::now(),
        }
    }
}

impl MemberSyncStatusChangedEvent {
    pub fn new(room_id: RoomId, member_id: MemberId, synced: bool, drift_secs: f64) -> Self {
        Self {
            room_id,
            member_id,
            synced,
            drift_secs,
            timestamp: Utc::now(),
        }
    }
}

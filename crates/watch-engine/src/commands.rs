//! Command request and response DTOs
//!
//! Requests implement `Deserialize` and `Validate`; shape validation runs
//! before any room state is touched. Responses implement `Serialize` and
//! are safe to hand to untrusted subscribers: a room's `access_secret` is
//! only ever exposed once, inside the `CreatedRoom` returned to the
//! creator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use watch_core::entities::{Room, RoomMember, RoomVisibility};
use watch_core::value_objects::{MemberId, RoomId, UserId};

// ============================================================================
// Requests
// ============================================================================

/// Create a room and join it as host
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRoomRequest {
    #[validate(length(min = 1, max = 64, message = "User id must be 1-64 characters"))]
    pub user_id: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,

    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    /// Opaque locator for the media being watched
    #[validate(length(min = 1, max = 512, message = "Media reference must be 1-512 characters"))]
    pub media_ref: String,

    #[serde(default)]
    pub visibility: RoomVisibility,

    /// Private rooms only; a missing secret is generated
    #[validate(length(min = 4, max = 64, message = "Access secret must be 4-64 characters"))]
    pub access_secret: Option<String>,
}

/// Join an existing room
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinRoomRequest {
    pub room_id: RoomId,

    #[validate(length(min = 1, max = 64, message = "User id must be 1-64 characters"))]
    pub user_id: String,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,

    pub access_secret: Option<String>,
}

/// Leave a room
#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRoomRequest {
    pub room_id: RoomId,
    pub member_id: MemberId,
}

/// Delete a room (host only)
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRoomRequest {
    pub room_id: RoomId,
    pub member_id: MemberId,
}

/// What a playback command does to the shared head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackAction {
    Play,
    Pause,
    Seek,
}

/// Mutate the room playback head (host only)
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackRequest {
    pub room_id: RoomId,
    pub member_id: MemberId,
    pub action: PlaybackAction,
    /// Required for `Seek`; optional repositioning for `Play`/`Pause`
    pub position_secs: Option<f64>,
    /// Playback speed; unchanged when absent
    pub speed: Option<f64>,
}

/// Presence update with the member's self-reported player state
#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatRequest {
    pub room_id: RoomId,
    pub member_id: MemberId,
    pub position_secs: f64,
    pub playing: bool,
}

/// Update a member's profile fields; absent fields stay unchanged
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    pub room_id: RoomId,
    pub member_id: MemberId,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 512, message = "Avatar reference must be at most 512 characters"))]
    pub avatar: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of a room. Never carries the access secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub title: String,
    pub media_ref: String,
    pub visibility: RoomVisibility,
    pub position_secs: f64,
    pub playing: bool,
    pub speed: f64,
    pub host_id: Option<MemberId>,
    pub member_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.clone(),
            title: room.title.clone(),
            media_ref: room.media_ref.clone(),
            visibility: room.visibility,
            position_secs: room.position_secs,
            playing: room.playing,
            speed: room.speed,
            host_id: room.host_id,
            member_count: room.member_count,
            created_at: room.created_at,
            last_activity_at: room.last_activity_at,
        }
    }
}

/// Public view of a room member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSummary {
    pub member_id: MemberId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_host: bool,
    pub synced: bool,
    pub joined_at: DateTime<Utc>,
}

impl From<&RoomMember> for MemberSummary {
    fn from(member: &RoomMember) -> Self {
        Self {
            member_id: member.id,
            room_id: member.room_id.clone(),
            user_id: member.user_id.clone(),
            display_name: member.display_name.clone(),
            avatar: member.avatar.clone(),
            is_host: member.is_host,
            synced: member.synced,
            joined_at: member.joined_at,
        }
    }
}

/// Result of `create_room`: the room, the creator's membership, and a
/// private room's secret, disclosed exactly once here
#[derive(Debug, Clone, Serialize)]
pub struct CreatedRoom {
    pub room: RoomSnapshot,
    pub host: MemberSummary,
    pub access_secret: Option<String>,
}

/// Result of `leave_room`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaveOutcome {
    pub was_host: bool,
    /// Member promoted in the departing host's place, if any
    pub new_host: Option<MemberId>,
}

/// Result of `heartbeat`: the member's standing plus the authoritative head
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeartbeatAck {
    pub drift_secs: f64,
    pub synced: bool,
    pub host_position_secs: f64,
    pub host_playing: bool,
    pub host_speed: f64,
}

/// Result of `get_host_state`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostStateView {
    pub room: RoomSnapshot,
    /// The caller's sync flag of record
    pub caller_synced: bool,
    /// Drift recomputed from the stored positions
    pub caller_drift_secs: f64,
}

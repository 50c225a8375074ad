//! Room member entity - one user's presence inside a room

use chrono::{DateTime, Utc};

use crate::value_objects::{MemberId, RoomId, UserId};

/// Room member entity (junction between an external user and a room)
#[derive(Debug, Clone, PartialEq)]
pub struct RoomMember {
    pub id: MemberId,
    pub room_id: RoomId,
    pub user_id: UserId,
    pub display_name: String,
    /// Optional avatar reference (URL or asset hash)
    pub avatar: Option<String>,
    pub is_host: bool,
    /// Result of the last sync evaluation against the host position
    pub synced: bool,
    /// Last self-reported playback position
    pub position_secs: f64,
    pub joined_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
}

impl RoomMember {
    /// Create a new RoomMember
    ///
    /// A joining host starts synced (it defines the reference position);
    /// everyone else starts unsynced until their first heartbeat.
    pub fn new(room_id: RoomId, user_id: UserId, display_name: String, is_host: bool) -> Self {
        let now = Utc::now();
        Self {
            id: MemberId::new(),
            room_id,
            user_id,
            display_name,
            avatar: None,
            is_host,
            synced: is_host,
            position_secs: 0.0,
            joined_at: now,
            last_heartbeat_at: now,
        }
    }

    /// Record a heartbeat: refresh presence and the self-reported position
    pub fn record_heartbeat(&mut self, position_secs: f64) {
        self.position_secs = position_secs;
        self.last_heartbeat_at = Utc::now();
    }

    /// Set the sync flag. Returns `true` when the flag flipped.
    pub fn set_synced(&mut self, synced: bool) -> bool {
        let changed = self.synced != synced;
        self.synced = synced;
        changed
    }

    /// Promote this member to host
    pub fn promote(&mut self) {
        self.is_host = true;
        self.synced = true;
    }

    /// Update the display name
    pub fn set_display_name(&mut self, display_name: String) {
        self.display_name = display_name;
    }

    /// Update the avatar reference
    pub fn set_avatar(&mut self, avatar: Option<String>) {
        self.avatar = avatar;
    }

    /// Check whether the last heartbeat predates the cutoff
    #[inline]
    pub fn is_stale(&self, cutoff: DateTime<Utc>) -> bool {
        self.last_heartbeat_at < cutoff
    }
}

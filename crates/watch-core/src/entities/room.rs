//! Room entity - a shared viewing session with a single playback head

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::value_objects::{MemberId, RoomId};

/// Length of a generated access secret (decimal digits)
const SECRET_LEN: usize = 6;

/// Generate a random numeric access secret for a private room
pub fn generate_access_secret() -> String {
    let mut rng = rand::thread_rng();
    (0..SECRET_LEN)
        .map(|_| char::from(b'0' + rng.gen_range(0..10)))
        .collect()
}

/// Room visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RoomVisibility {
    #[default]
    Public,
    Private,
}

impl RoomVisibility {
    /// Get the storage representation
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

impl std::str::FromStr for RoomVisibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            other => Err(format!("unknown room visibility: {other}")),
        }
    }
}

/// Room entity
///
/// The playback head (`position_secs`, `playing`, `speed`) is only ever
/// mutated through the host authority path; member heartbeats record their
/// own positions on [`crate::entities::RoomMember`] instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: RoomId,
    pub title: String,
    /// Opaque locator for the media being watched (URL, catalog ID, ...)
    pub media_ref: String,
    pub visibility: RoomVisibility,
    /// Present iff the room is private
    pub access_secret: Option<String>,
    pub position_secs: f64,
    pub playing: bool,
    pub speed: f64,
    /// None only while the roster is empty
    pub host_id: Option<MemberId>,
    pub member_count: u32,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    /// Set when the last member departs; cleared on rejoin
    pub empty_since: Option<DateTime<Utc>>,
}

impl Room {
    /// Create a new Room (paused at position zero, no host yet)
    pub fn new(
        id: RoomId,
        title: String,
        media_ref: String,
        visibility: RoomVisibility,
        access_secret: Option<String>,
    ) -> Self {
        let now = Utc::now();
        let access_secret = match visibility {
            RoomVisibility::Private => {
                Some(access_secret.unwrap_or_else(generate_access_secret))
            }
            RoomVisibility::Public => None,
        };
        Self {
            id,
            title,
            media_ref,
            visibility,
            access_secret,
            position_secs: 0.0,
            playing: false,
            speed: 1.0,
            host_id: None,
            member_count: 0,
            created_at: now,
            last_activity_at: now,
            empty_since: None,
        }
    }

    /// Check if the room is private
    #[inline]
    pub fn is_private(&self) -> bool {
        self.visibility == RoomVisibility::Private
    }

    /// Check whether a join attempt's secret grants access.
    /// Public rooms admit everyone regardless of the supplied secret.
    pub fn verify_secret(&self, supplied: Option<&str>) -> bool {
        match (&self.access_secret, supplied) {
            (None, _) => true,
            (Some(expected), Some(given)) => expected == given,
            (Some(_), None) => false,
        }
    }

    /// Check if a member is the current host
    #[inline]
    pub fn is_host(&self, member_id: MemberId) -> bool {
        self.host_id == Some(member_id)
    }

    /// Apply a host playback mutation to the shared head
    pub fn apply_playback(&mut self, position_secs: f64, playing: bool, speed: f64) {
        self.position_secs = position_secs;
        self.playing = playing;
        self.speed = speed;
        self.last_activity_at = Utc::now();
    }

    /// Install a new host
    pub fn set_host(&mut self, member_id: MemberId) {
        self.host_id = Some(member_id);
        self.last_activity_at = Utc::now();
    }

    /// Remove the host (roster emptied)
    pub fn clear_host(&mut self) {
        self.host_id = None;
    }

    /// Record a departure that left the roster empty
    pub fn mark_empty(&mut self) {
        self.empty_since = Some(Utc::now());
    }

    /// Clear the empty marker (somebody joined again)
    pub fn mark_occupied(&mut self) {
        self.empty_since = None;
    }

    /// Bump the activity timestamp
    pub fn touch(&mut self) {
        self.last_activity_at = Utc::now();
    }
}

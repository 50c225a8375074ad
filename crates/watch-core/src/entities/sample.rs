//! Sync sample entity - audit record of a single sync evaluation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::sync;
use crate::value_objects::{MemberId, RoomId};

/// What triggered a sync evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleKind {
    Heartbeat,
    Seek,
    PlayPause,
    Join,
    Leave,
}

impl SampleKind {
    /// Get the storage representation
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::Seek => "seek",
            Self::PlayPause => "play_pause",
            Self::Join => "join",
            Self::Leave => "leave",
        }
    }
}

impl std::str::FromStr for SampleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heartbeat" => Ok(Self::Heartbeat),
            "seek" => Ok(Self::Seek),
            "play_pause" => Ok(Self::PlayPause),
            "join" => Ok(Self::Join),
            "leave" => Ok(Self::Leave),
            other => Err(format!("unknown sample kind: {other}")),
        }
    }
}

/// One recorded sync evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct SyncSample {
    /// Store-assigned; zero until persisted
    pub id: i64,
    pub room_id: RoomId,
    pub member_id: MemberId,
    pub kind: SampleKind,
    pub host_position_secs: f64,
    pub member_position_secs: f64,
    pub drift_secs: f64,
    pub synced: bool,
    pub recorded_at: DateTime<Utc>,
}

impl SyncSample {
    /// Record a sample, computing drift and sync status from the positions
    pub fn record(
        room_id: RoomId,
        member_id: MemberId,
        kind: SampleKind,
        host_position_secs: f64,
        member_position_secs: f64,
    ) -> Self {
        let eval = sync::evaluate(host_position_secs, member_position_secs);
        Self {
            id: 0,
            room_id,
            member_id,
            kind,
            host_position_secs,
            member_position_secs,
            drift_secs: eval.drift_secs,
            synced: eval.synced,
            recorded_at: Utc::now(),
        }
    }
}

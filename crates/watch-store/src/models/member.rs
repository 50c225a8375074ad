//! Room member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the room_members table
#[derive(Debug, Clone, FromRow)]
pub struct RoomMemberModel {
    pub id: Uuid,
    pub room_id: String,
    pub user_id: String,
    pub display_name: String,
    pub avatar: Option<String>,
    pub is_host: bool,
    pub synced: bool,
    pub position_secs: f64,
    pub joined_at: DateTime<Utc>,
    pub last_heartbeat_at: DateTime<Utc>,
}

//! Room database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the rooms table
#[derive(Debug, Clone, FromRow)]
pub struct RoomModel {
    pub id: String,
    pub title: String,
    pub media_ref: String,
    pub visibility: String,
    pub access_secret: Option<String>,
    pub position_secs: f64,
    pub playing: bool,
    pub speed: f64,
    pub host_id: Option<Uuid>,
    pub member_count: i32,
    pub created_at: DateTime<Utc>,
    pub last_activity_at: DateTime<Utc>,
    pub empty_since: Option<DateTime<Utc>>,
}

//! Sync sample database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for the sync_samples table
#[derive(Debug, Clone, FromRow)]
pub struct SyncSampleModel {
    pub id: i64,
    pub room_id: String,
    pub member_id: Uuid,
    pub kind: String,
    pub host_position_secs: f64,
    pub member_position_secs: f64,
    pub drift_secs: f64,
    pub synced: bool,
    pub recorded_at: DateTime<Utc>,
}

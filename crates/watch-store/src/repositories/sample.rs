//! PostgreSQL implementation of SampleRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use watch_core::entities::SyncSample;
use watch_core::traits::{RepoResult, SampleRepository};
use watch_core::value_objects::RoomId;

use crate::mappers::sample_from_model;
use crate::models::SyncSampleModel;

use super::error::map_db_error;

/// PostgreSQL implementation of SampleRepository
#[derive(Clone)]
pub struct PgSampleRepository {
    pool: PgPool,
}

impl PgSampleRepository {
    /// Create a new PgSampleRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SampleRepository for PgSampleRepository {
    #[instrument(skip(self, sample), fields(room_id = %sample.room_id, kind = sample.kind.as_str()))]
    async fn insert(&self, sample: &SyncSample) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO sync_samples
                (room_id, member_id, kind, host_position_secs, member_position_secs,
                 drift_secs, synced, recorded_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(sample.room_id.as_str())
        .bind(sample.member_id.into_inner())
        .bind(sample.kind.as_str())
        .bind(sample.host_position_secs)
        .bind(sample.member_position_secs)
        .bind(sample.drift_secs)
        .bind(sample.synced)
        .bind(sample.recorded_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_recent(&self, room_id: &RoomId, limit: i64) -> RepoResult<Vec<SyncSample>> {
        let limit = limit.clamp(1, 1000);

        let rows = sqlx::query_as::<_, SyncSampleModel>(
            r#"
            SELECT id, room_id, member_id, kind, host_position_secs, member_position_secs,
                   drift_secs, synced, recorded_at
            FROM sync_samples
            WHERE room_id = $1
            ORDER BY recorded_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(room_id.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(sample_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn delete_by_room(&self, room_id: &RoomId) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM sync_samples WHERE room_id = $1")
            .bind(room_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn delete_recorded_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM sync_samples WHERE recorded_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

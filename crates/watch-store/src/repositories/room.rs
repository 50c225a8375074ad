//! PostgreSQL implementation of RoomRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use watch_core::entities::Room;
use watch_core::error::DomainError;
use watch_core::traits::{RepoResult, RoomRepository};
use watch_core::value_objects::{MemberId, RoomId};

use crate::mappers::room_from_model;
use crate::models::RoomModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of RoomRepository
#[derive(Clone)]
pub struct PgRoomRepository {
    pool: PgPool,
}

impl PgRoomRepository {
    /// Create a new PgRoomRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoomRepository for PgRoomRepository {
    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn create(&self, room: &Room) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rooms
                (id, title, media_ref, visibility, access_secret, position_secs,
                 playing, speed, host_id, member_count, created_at, last_activity_at, empty_since)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(room.id.as_str())
        .bind(&room.title)
        .bind(&room.media_ref)
        .bind(room.visibility.as_str())
        .bind(&room.access_secret)
        .bind(room.position_secs)
        .bind(room.playing)
        .bind(room.speed)
        .bind(room.host_id.map(MemberId::into_inner))
        .bind(room.member_count as i32)
        .bind(room.created_at)
        .bind(room.last_activity_at)
        .bind(room.empty_since)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Storage(format!("room token collision: {}", room.id))
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &RoomId) -> RepoResult<Option<Room>> {
        let result = sqlx::query_as::<_, RoomModel>(
            r#"
            SELECT id, title, media_ref, visibility, access_secret, position_secs,
                   playing, speed, host_id, member_count, created_at, last_activity_at, empty_since
            FROM rooms
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(room_from_model).transpose()
    }

    #[instrument(skip(self, room), fields(room_id = %room.id))]
    async fn update(&self, room: &Room) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE rooms SET
                title = $2,
                media_ref = $3,
                visibility = $4,
                access_secret = $5,
                position_secs = $6,
                playing = $7,
                speed = $8,
                host_id = $9,
                member_count = $10,
                last_activity_at = $11,
                empty_since = $12
            WHERE id = $1
            "#,
        )
        .bind(room.id.as_str())
        .bind(&room.title)
        .bind(&room.media_ref)
        .bind(room.visibility.as_str())
        .bind(&room.access_secret)
        .bind(room.position_secs)
        .bind(room.playing)
        .bind(room.speed)
        .bind(room.host_id.map(MemberId::into_inner))
        .bind(room.member_count as i32)
        .bind(room.last_activity_at)
        .bind(room.empty_since)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::RoomNotFound(room.id.clone()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &RoomId) -> RepoResult<()> {
        // Idempotent: the sweeper may race an explicit delete
        sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_public(&self) -> RepoResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomModel>(
            r#"
            SELECT id, title, media_ref, visibility, access_secret, position_secs,
                   playing, speed, host_id, member_count, created_at, last_activity_at, empty_since
            FROM rooms
            WHERE visibility = 'public'
            ORDER BY last_activity_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(room_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn find_empty_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Room>> {
        let rows = sqlx::query_as::<_, RoomModel>(
            r#"
            SELECT id, title, media_ref, visibility, access_secret, position_secs,
                   playing, speed, host_id, member_count, created_at, last_activity_at, empty_since
            FROM rooms
            WHERE empty_since IS NOT NULL AND empty_since < $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(room_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM rooms")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

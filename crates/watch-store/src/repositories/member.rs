//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use watch_core::entities::RoomMember;
use watch_core::error::DomainError;
use watch_core::traits::{MemberRepository, RepoResult};
use watch_core::value_objects::{MemberId, RoomId, UserId};

use crate::mappers::member_from_model;
use crate::models::RoomMemberModel;

use super::error::{map_db_error, map_unique_violation};

/// PostgreSQL implementation of MemberRepository
#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    /// Create a new PgMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self, member), fields(room_id = %member.room_id, member_id = %member.id))]
    async fn insert(&self, member: &RoomMember) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO room_members
                (id, room_id, user_id, display_name, avatar, is_host, synced,
                 position_secs, joined_at, last_heartbeat_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(member.id.into_inner())
        .bind(member.room_id.as_str())
        .bind(member.user_id.as_str())
        .bind(&member.display_name)
        .bind(member.avatar.as_deref())
        .bind(member.is_host)
        .bind(member.synced)
        .bind(member.position_secs)
        .bind(member.joined_at)
        .bind(member.last_heartbeat_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyJoined))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MemberId) -> RepoResult<Option<RoomMember>> {
        let result = sqlx::query_as::<_, RoomMemberModel>(
            r#"
            SELECT id, room_id, user_id, display_name, avatar, is_host, synced,
                   position_secs, joined_at, last_heartbeat_at
            FROM room_members
            WHERE id = $1
            "#,
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(member_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_room_and_user(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> RepoResult<Option<RoomMember>> {
        let result = sqlx::query_as::<_, RoomMemberModel>(
            r#"
            SELECT id, room_id, user_id, display_name, avatar, is_host, synced,
                   position_secs, joined_at, last_heartbeat_at
            FROM room_members
            WHERE room_id = $1 AND user_id = $2
            "#,
        )
        .bind(room_id.as_str())
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(member_from_model).transpose()
    }

    #[instrument(skip(self))]
    async fn list_by_room(&self, room_id: &RoomId) -> RepoResult<Vec<RoomMember>> {
        let rows = sqlx::query_as::<_, RoomMemberModel>(
            r#"
            SELECT id, room_id, user_id, display_name, avatar, is_host, synced,
                   position_secs, joined_at, last_heartbeat_at
            FROM room_members
            WHERE room_id = $1
            ORDER BY joined_at, id
            "#,
        )
        .bind(room_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(member_from_model).collect()
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn update(&self, member: &RoomMember) -> RepoResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE room_members SET
                display_name = $2,
                avatar = $3,
                is_host = $4,
                synced = $5,
                position_secs = $6,
                last_heartbeat_at = $7
            WHERE id = $1
            "#,
        )
        .bind(member.id.into_inner())
        .bind(&member.display_name)
        .bind(member.avatar.as_deref())
        .bind(member.is_host)
        .bind(member.synced)
        .bind(member.position_secs)
        .bind(member.last_heartbeat_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MemberNotFound(member.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: MemberId) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM room_members WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MemberNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_by_room(&self, room_id: &RoomId) -> RepoResult<u64> {
        let result = sqlx::query("DELETE FROM room_members WHERE room_id = $1")
            .bind(room_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn find_stale(
        &self,
        room_id: &RoomId,
        cutoff: DateTime<Utc>,
    ) -> RepoResult<Vec<RoomMember>> {
        let rows = sqlx::query_as::<_, RoomMemberModel>(
            r#"
            SELECT id, room_id, user_id, display_name, avatar, is_host, synced,
                   position_secs, joined_at, last_heartbeat_at
            FROM room_members
            WHERE room_id = $1 AND last_heartbeat_at < $2
            ORDER BY joined_at, id
            "#,
        )
        .bind(room_id.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(member_from_model).collect()
    }

    #[instrument(skip(self))]
    async fn rooms_with_stale_members(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<RoomId>> {
        let tokens = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT room_id
            FROM room_members
            WHERE last_heartbeat_at < $1
            "#,
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        tokens
            .into_iter()
            .map(|t| {
                RoomId::parse(&t)
                    .map_err(|e| DomainError::Storage(format!("corrupt room id {t:?}: {e}")))
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn count_by_room(&self, room_id: &RoomId) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM room_members WHERE room_id = $1")
            .bind(room_id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

//! PostgreSQL implementation of RateLimitStore
//!
//! Sliding window over a plain event table: expired rows for the bucket
//! are pruned, then the event is inserted only while the bucket is under
//! its limit, all inside one transaction. Denied attempts write nothing,
//! so hammering a closed bucket cannot keep it closed.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::time::Duration;
use tracing::instrument;

use watch_core::error::DomainError;
use watch_core::traits::{RateLimitStore, RepoResult};

use super::error::map_db_error;

/// PostgreSQL implementation of RateLimitStore
#[derive(Clone)]
pub struct PgRateLimitStore {
    pool: PgPool,
}

impl PgRateLimitStore {
    /// Create a new PgRateLimitStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RateLimitStore for PgRateLimitStore {
    #[instrument(skip(self))]
    async fn acquire(&self, key: &str, window: Duration, limit: u32) -> RepoResult<bool> {
        let now = Utc::now();
        let window = chrono::Duration::from_std(window)
            .map_err(|e| DomainError::Storage(format!("window out of range: {e}")))?;
        let window_start = now - window;

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query("DELETE FROM rate_limit_events WHERE bucket_key = $1 AND occurred_at < $2")
            .bind(key)
            .bind(window_start)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO rate_limit_events (bucket_key, occurred_at)
            SELECT $1, $2
            WHERE (
                SELECT COUNT(*) FROM rate_limit_events
                WHERE bucket_key = $1 AND occurred_at >= $3
            ) < $4
            RETURNING id
            "#,
        )
        .bind(key)
        .bind(now)
        .bind(window_start)
        .bind(i64::from(limit))
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(inserted.is_some())
    }
}

//! In-memory implementation of RateLimitStore

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use watch_core::error::DomainError;
use watch_core::traits::{RateLimitStore, RepoResult};

/// In-memory implementation of RateLimitStore
///
/// Keeps one timestamp vector per bucket. `set_failing(true)` makes every
/// call return a storage error, which tests use to exercise the limiter's
/// fail-open behavior.
#[derive(Default)]
pub struct MemoryRateLimitStore {
    windows: DashMap<String, Vec<DateTime<Utc>>>,
    failing: AtomicBool,
}

impl MemoryRateLimitStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated store failure
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::Relaxed);
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    async fn acquire(&self, key: &str, window: Duration, limit: u32) -> RepoResult<bool> {
        if self.failing.load(Ordering::Relaxed) {
            return Err(DomainError::Storage(
                "rate limit store unavailable".to_string(),
            ));
        }

        let now = Utc::now();
        let window = chrono::Duration::from_std(window)
            .map_err(|e| DomainError::Storage(format!("window out of range: {e}")))?;
        let window_start = now - window;

        let mut bucket = self.windows.entry(key.to_string()).or_default();
        bucket.retain(|t| *t >= window_start);
        if bucket.len() as u32 >= limit {
            // Denied attempts leave no trace
            return Ok(false);
        }
        bucket.push(now);
        Ok(true)
    }
}

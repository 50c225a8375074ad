//! Command rate limiting
//!
//! Sliding-window limits keyed per (action, user). The backing store does
//! the counting; this layer maps counts to `RateLimited` errors. A failing
//! store is logged and the command allowed: availability wins over strict
//! enforcement here.

use std::sync::Arc;

use tracing::{instrument, warn};

use watch_core::error::DomainError;
use watch_core::traits::RateLimitStore;
use watch_core::value_objects::UserId;

use crate::config::{EngineConfig, RateRule};

/// Rate-limited action categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    RoomCreate,
    PlaybackControl,
    CommentCreate,
    RoomMembership,
}

impl ActionKind {
    /// Get the bucket-key prefix for this action
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RoomCreate => "room_create",
            Self::PlaybackControl => "playback_control",
            Self::CommentCreate => "comment_create",
            Self::RoomMembership => "room_membership",
        }
    }
}

/// Per-user command rate limiter
pub struct RateLimiter {
    store: Arc<dyn RateLimitStore>,
    room_create: RateRule,
    playback_control: RateRule,
    comment_create: RateRule,
    room_membership: RateRule,
}

impl RateLimiter {
    /// Create a limiter with the rules from the engine configuration
    pub fn new(store: Arc<dyn RateLimitStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            room_create: config.room_create_rule,
            playback_control: config.playback_control_rule,
            comment_create: config.comment_create_rule,
            room_membership: config.room_membership_rule,
        }
    }

    fn rule(&self, kind: ActionKind) -> RateRule {
        match kind {
            ActionKind::RoomCreate => self.room_create,
            ActionKind::PlaybackControl => self.playback_control,
            ActionKind::CommentCreate => self.comment_create,
            ActionKind::RoomMembership => self.room_membership,
        }
    }

    /// Check whether a user may perform an action.
    ///
    /// Allowed attempts are recorded against the window; denied ones are
    /// not, so a caller hammering a closed bucket reopens it as soon as
    /// the admitted events age out.
    ///
    /// A store failure allows the action (fail open): the limiter protects
    /// against abuse, and a degraded store must not take commands down
    /// with it.
    #[instrument(skip(self), fields(action = kind.as_str()))]
    pub async fn check(&self, user_id: &UserId, kind: ActionKind) -> Result<(), DomainError> {
        let rule = self.rule(kind);
        let key = format!("{}:{}", kind.as_str(), user_id);

        match self.store.acquire(&key, rule.window, rule.limit).await {
            Ok(false) => Err(DomainError::RateLimited {
                action: kind.as_str(),
                retry_after_secs: rule.window.as_secs(),
            }),
            Ok(true) => Ok(()),
            Err(e) => {
                warn!(
                    user_id = %user_id,
                    action = kind.as_str(),
                    error = %e,
                    "Rate limit store failed, allowing action"
                );
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("room_create", &self.room_create)
            .field("playback_control", &self.playback_control)
            .field("comment_create", &self.comment_create)
            .field("room_membership", &self.room_membership)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use watch_store::MemoryRateLimitStore;

    // Default rules apply: playback control is limited to 2 per second
    fn limiter_with(store: Arc<MemoryRateLimitStore>) -> RateLimiter {
        RateLimiter::new(store, &EngineConfig::default())
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_rejects() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let limiter = limiter_with(store);
        let user = UserId::new("user-1");

        limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap();
        limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap();

        let err = limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap_err();
        assert!(err.is_rate_limited());
        assert_eq!(err.code(), "RATE_LIMITED");
    }

    #[tokio::test]
    async fn test_users_are_counted_separately() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let limiter = limiter_with(store);

        let alice = UserId::new("alice");
        let bob = UserId::new("bob");

        limiter
            .check(&alice, ActionKind::PlaybackControl)
            .await
            .unwrap();
        limiter
            .check(&alice, ActionKind::PlaybackControl)
            .await
            .unwrap();

        // Alice is exhausted, Bob is untouched
        assert!(limiter
            .check(&alice, ActionKind::PlaybackControl)
            .await
            .is_err());
        assert!(limiter
            .check(&bob, ActionKind::PlaybackControl)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_actions_are_counted_separately() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let limiter = limiter_with(store);
        let user = UserId::new("user-1");

        limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap();
        limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap();

        // A different action has its own bucket
        assert!(limiter.check(&user, ActionKind::RoomCreate).await.is_ok());
    }

    #[tokio::test]
    async fn test_denied_attempts_do_not_extend_lockout() {
        let store = Arc::new(MemoryRateLimitStore::new());
        let config = EngineConfig {
            playback_control_rule: RateRule::new(1, 1),
            ..EngineConfig::default()
        };
        let limiter = RateLimiter::new(store, &config);
        let user = UserId::new("user-1");

        // Bucket fills at t=0
        limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap();

        // A late denied attempt inside the same window
        tokio::time::sleep(std::time::Duration::from_millis(600)).await;
        assert!(limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .is_err());

        // Past the window of the admitted event. Had the denied attempt
        // been recorded, it would still be inside its own window here.
        tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        limiter
            .check(&user, ActionKind::PlaybackControl)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_fails_open_when_store_is_down() {
        let store = Arc::new(MemoryRateLimitStore::new());
        store.set_failing(true);
        let limiter = limiter_with(store);
        let user = UserId::new("user-1");

        // Every check succeeds while the store errors, well past the limit
        for _ in 0..10 {
            limiter
                .check(&user, ActionKind::PlaybackControl)
                .await
                .unwrap();
        }
    }
}

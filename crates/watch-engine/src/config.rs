//! Engine configuration
//!
//! Timings and rate-limit rules for the room engine. Every knob has a
//! default; `from_env` overrides the timings from `ENGINE_*` variables.

use std::env;
use std::time::Duration;

/// One rate-limit rule: how many events fit in a sliding window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateRule {
    /// Maximum number of events inside the window
    pub limit: u32,
    /// Window length
    pub window: Duration,
}

impl RateRule {
    /// Create a rule
    #[must_use]
    pub const fn new(limit: u32, window_secs: u64) -> Self {
        Self {
            limit,
            window: Duration::from_secs(window_secs),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Members silent for longer than this are evicted by the sweeper
    pub member_timeout: Duration,
    /// How often the eviction sweep runs
    pub sweep_interval: Duration,
    /// How long an empty room survives before the sweeper deletes it
    pub empty_room_grace: Duration,
    /// How long sync samples are kept before purging
    pub sample_retention: Duration,
    /// How long a command may wait for its room lock
    pub command_timeout: Duration,
    /// Per-room broadcast channel capacity
    pub event_buffer: usize,
    /// Room creations per user
    pub room_create_rule: RateRule,
    /// Playback commands per user
    pub playback_control_rule: RateRule,
    /// Comment creations per user
    pub comment_create_rule: RateRule,
    /// Joins and leaves per user
    pub room_membership_rule: RateRule,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            member_timeout: Duration::from_secs(30),
            sweep_interval: Duration::from_secs(10),
            empty_room_grace: Duration::from_secs(60 * 60),
            sample_retention: Duration::from_secs(24 * 60 * 60),
            command_timeout: Duration::from_secs(5),
            event_buffer: 256,
            room_create_rule: RateRule::new(10, 3600),
            playback_control_rule: RateRule::new(2, 1),
            comment_create_rule: RateRule::new(5, 60),
            room_membership_rule: RateRule::new(20, 3600),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            member_timeout: duration_var("ENGINE_MEMBER_TIMEOUT_SECS", defaults.member_timeout),
            sweep_interval: duration_var("ENGINE_SWEEP_INTERVAL_SECS", defaults.sweep_interval),
            empty_room_grace: duration_var(
                "ENGINE_EMPTY_ROOM_GRACE_SECS",
                defaults.empty_room_grace,
            ),
            sample_retention: duration_var(
                "ENGINE_SAMPLE_RETENTION_SECS",
                defaults.sample_retention,
            ),
            command_timeout: duration_var("ENGINE_COMMAND_TIMEOUT_SECS", defaults.command_timeout),
            event_buffer: env::var("ENGINE_EVENT_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.event_buffer),
            ..defaults
        }
    }
}

fn duration_var(name: &str, default: Duration) -> Duration {
    env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(default)
}

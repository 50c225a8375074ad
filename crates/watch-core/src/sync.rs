//! Playback sync math - pure drift computation, no I/O
//!
//! A member is in sync when their last-reported playback position is within
//! [`SYNC_TOLERANCE_SECS`] of the host's position. The boundary is inclusive:
//! a drift of exactly 2.0 seconds still counts as synced.

use serde::{Deserialize, Serialize};

/// Maximum drift (seconds) a member may show and still be considered in sync
pub const SYNC_TOLERANCE_SECS: f64 = 2.0;

/// Result of a sync evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyncEvaluation {
    /// Absolute distance between host and member positions (seconds)
    pub drift_secs: f64,
    /// Whether the drift is within tolerance
    pub synced: bool,
}

/// Absolute drift between host and member positions
#[inline]
pub fn drift(host_position_secs: f64, member_position_secs: f64) -> f64 {
    (host_position_secs - member_position_secs).abs()
}

/// Whether a drift is within tolerance (inclusive). NaN is never synced.
#[inline]
pub fn is_synced(drift_secs: f64) -> bool {
    drift_secs <= SYNC_TOLERANCE_SECS
}

/// Evaluate a member's position against the host's
pub fn evaluate(host_position_secs: f64, member_position_secs: f64) -> SyncEvaluation {
    let drift_secs = drift(host_position_secs, member_position_secs);
    SyncEvaluation {
        drift_secs,
        synced: is_synced(drift_secs),
    }
}

//! Background sweeper
//!
//! Periodically evicts members whose heartbeats stopped, deletes rooms
//! that have sat empty past the grace period, and purges sync samples
//! older than the retention window. Each room is swept under its room
//! lock, so a sweep never races a command for the same room; the stale
//! and empty scans are re-checked under the lock because a heartbeat or
//! rejoin may have landed between the scan and acquisition.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, error, info, warn};

use crate::context::EngineContext;
use crate::services::{PresenceService, RoomService};
use crate::EngineResult;

/// Counts from one sweep pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub members_evicted: u64,
    pub rooms_expired: u64,
    pub samples_purged: u64,
}

impl SweepReport {
    /// Whether the pass changed nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members_evicted == 0 && self.rooms_expired == 0 && self.samples_purged == 0
    }
}

/// Periodic eviction and retention sweeper
pub struct EvictionScheduler {
    ctx: Arc<EngineContext>,
    running: Arc<AtomicBool>,
}

impl EvictionScheduler {
    /// Create a new scheduler (not yet running)
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self {
            ctx,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start the background sweep loop
    pub fn start(self: Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Eviction scheduler is already running");
            return;
        }

        let scheduler = self.clone();
        tokio::spawn(async move {
            scheduler.run().await;
        });

        info!(
            interval_secs = self.ctx.config().sweep_interval.as_secs(),
            "Eviction scheduler started"
        );
    }

    /// Stop the sweep loop. The current pass, if any, runs to completion.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("Eviction scheduler stopped");
    }

    /// Check if the scheduler is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    async fn run(&self) {
        let mut ticker = tokio::time::interval(self.ctx.config().sweep_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately; consume it so the first
        // sweep lands one full interval after start
        ticker.tick().await;

        while self.running.load(Ordering::SeqCst) {
            ticker.tick().await;
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            match self.sweep().await {
                Ok(report) if report.is_empty() => {}
                Ok(report) => {
                    info!(
                        members_evicted = report.members_evicted,
                        rooms_expired = report.rooms_expired,
                        samples_purged = report.samples_purged,
                        "Sweep completed"
                    );
                }
                Err(e) => error!(error = %e, "Sweep failed"),
            }
        }

        self.running.store(false, Ordering::SeqCst);
        debug!("Eviction loop ended");
    }

    /// Run one sweep pass immediately
    pub async fn sweep(&self) -> EngineResult<SweepReport> {
        let members_evicted = self.evict_stale_members().await?;
        let rooms_expired = self.expire_empty_rooms().await?;
        let samples_purged = self.purge_old_samples().await?;
        Ok(SweepReport {
            members_evicted,
            rooms_expired,
            samples_purged,
        })
    }

    /// Remove members whose last heartbeat predates the timeout
    async fn evict_stale_members(&self) -> EngineResult<u64> {
        let presence = PresenceService::new(&self.ctx);
        let room_ids = presence.rooms_with_stale_members().await?;

        let mut evicted = 0u64;
        for room_id in room_ids {
            let lock = self.ctx.room_lock(&room_id);
            let _guard = lock.lock().await;

            let Some(mut room) = self.ctx.room_repo().find_by_id(&room_id).await? else {
                continue;
            };
            // Re-scan under the lock: a heartbeat may have landed since
            let stale = self
                .ctx
                .member_repo()
                .find_stale(&room_id, presence.stale_cutoff())
                .await?;

            let rooms = RoomService::new(&self.ctx);
            for member in stale {
                match rooms.remove_member(&mut room, &member).await {
                    Ok(outcome) => {
                        evicted += 1;
                        info!(
                            room_id = %room_id,
                            member_id = %member.id,
                            was_host = outcome.was_host,
                            "Evicted stale member"
                        );
                    }
                    Err(e) => {
                        error!(
                            room_id = %room_id,
                            member_id = %member.id,
                            error = %e,
                            "Failed to evict stale member"
                        );
                    }
                }
            }
        }
        Ok(evicted)
    }

    /// Delete rooms that have sat empty past the grace period
    async fn expire_empty_rooms(&self) -> EngineResult<u64> {
        let grace = Duration::seconds(self.ctx.config().empty_room_grace.as_secs() as i64);
        let cutoff = Utc::now() - grace;
        let candidates = self.ctx.room_repo().find_empty_before(cutoff).await?;

        let mut expired = 0u64;
        for candidate in candidates {
            let lock = self.ctx.room_lock(&candidate.id);
            let _guard = lock.lock().await;

            let Some(room) = self.ctx.room_repo().find_by_id(&candidate.id).await? else {
                self.ctx.remove_room_lock(&candidate.id);
                continue;
            };
            // A rejoin since the scan clears the marker
            let still_expired =
                room.member_count == 0 && room.empty_since.is_some_and(|t| t < cutoff);
            if !still_expired {
                continue;
            }

            self.ctx.member_repo().delete_by_room(&room.id).await?;
            self.ctx.sample_repo().delete_by_room(&room.id).await?;
            self.ctx.room_repo().delete(&room.id).await?;
            self.ctx.broadcaster().close_room(&room.id);
            self.ctx.remove_room_lock(&room.id);

            expired += 1;
            info!(room_id = %room.id, "Expired empty room");
        }
        Ok(expired)
    }

    /// Purge samples older than the retention window
    async fn purge_old_samples(&self) -> EngineResult<u64> {
        let retention = Duration::seconds(self.ctx.config().sample_retention.as_secs() as i64);
        self.ctx
            .sample_repo()
            .delete_recorded_before(Utc::now() - retention)
            .await
    }
}

impl Drop for EvictionScheduler {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

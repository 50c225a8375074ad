//! In-memory implementation of SampleRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use watch_core::entities::SyncSample;
use watch_core::traits::{RepoResult, SampleRepository};
use watch_core::value_objects::RoomId;

/// In-memory implementation of SampleRepository
#[derive(Default)]
pub struct MemorySampleRepository {
    samples: Mutex<Vec<SyncSample>>,
    next_id: AtomicI64,
}

impl MemorySampleRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SampleRepository for MemorySampleRepository {
    async fn insert(&self, sample: &SyncSample) -> RepoResult<i64> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let mut stored = sample.clone();
        stored.id = id;
        self.samples.lock().push(stored);
        Ok(id)
    }

    async fn list_recent(&self, room_id: &RoomId, limit: i64) -> RepoResult<Vec<SyncSample>> {
        let samples = self.samples.lock();
        let mut matching: Vec<SyncSample> = samples
            .iter()
            .filter(|s| &s.room_id == room_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.recorded_at
                .cmp(&a.recorded_at)
                .then(b.id.cmp(&a.id))
        });
        matching.truncate(limit.clamp(1, 1000) as usize);
        Ok(matching)
    }

    async fn delete_by_room(&self, room_id: &RoomId) -> RepoResult<u64> {
        let mut samples = self.samples.lock();
        let before = samples.len();
        samples.retain(|s| &s.room_id != room_id);
        Ok((before - samples.len()) as u64)
    }

    async fn delete_recorded_before(&self, cutoff: DateTime<Utc>) -> RepoResult<u64> {
        let mut samples = self.samples.lock();
        let before = samples.len();
        samples.retain(|s| s.recorded_at >= cutoff);
        Ok((before - samples.len()) as u64)
    }
}

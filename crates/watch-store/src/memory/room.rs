//! In-memory implementation of RoomRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;

use watch_core::entities::Room;
use watch_core::error::DomainError;
use watch_core::traits::{RepoResult, RoomRepository};
use watch_core::value_objects::RoomId;

/// In-memory implementation of RoomRepository
#[derive(Default)]
pub struct MemoryRoomRepository {
    rooms: DashMap<RoomId, Room>,
}

impl MemoryRoomRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    async fn create(&self, room: &Room) -> RepoResult<()> {
        if self.rooms.contains_key(&room.id) {
            return Err(DomainError::Storage(format!(
                "room token collision: {}",
                room.id
            )));
        }
        self.rooms.insert(room.id.clone(), room.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RoomId) -> RepoResult<Option<Room>> {
        Ok(self.rooms.get(id).map(|r| r.clone()))
    }

    async fn update(&self, room: &Room) -> RepoResult<()> {
        match self.rooms.get_mut(&room.id) {
            Some(mut entry) => {
                *entry = room.clone();
                Ok(())
            }
            None => Err(DomainError::RoomNotFound(room.id.clone())),
        }
    }

    async fn delete(&self, id: &RoomId) -> RepoResult<()> {
        self.rooms.remove(id);
        Ok(())
    }

    async fn list_public(&self) -> RepoResult<Vec<Room>> {
        let mut rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|r| !r.is_private())
            .map(|r| r.clone())
            .collect();
        rooms.sort_by(|a, b| b.last_activity_at.cmp(&a.last_activity_at));
        Ok(rooms)
    }

    async fn find_empty_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Room>> {
        Ok(self
            .rooms
            .iter()
            .filter(|r| r.empty_since.is_some_and(|t| t < cutoff))
            .map(|r| r.clone())
            .collect())
    }

    async fn count(&self) -> RepoResult<i64> {
        Ok(self.rooms.len() as i64)
    }
}

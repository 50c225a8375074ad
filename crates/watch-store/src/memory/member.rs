//! In-memory implementation of MemberRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::collections::HashSet;

use watch_core::entities::RoomMember;
use watch_core::error::DomainError;
use watch_core::traits::{MemberRepository, RepoResult};
use watch_core::value_objects::{MemberId, RoomId, UserId};

/// In-memory implementation of MemberRepository
#[derive(Default)]
pub struct MemoryMemberRepository {
    members: DashMap<MemberId, RoomMember>,
}

impl MemoryMemberRepository {
    /// Create an empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by_join_order(mut members: Vec<RoomMember>) -> Vec<RoomMember> {
        members.sort_by(|a, b| a.joined_at.cmp(&b.joined_at).then(a.id.cmp(&b.id)));
        members
    }
}

#[async_trait]
impl MemberRepository for MemoryMemberRepository {
    async fn insert(&self, member: &RoomMember) -> RepoResult<()> {
        let duplicate = self
            .members
            .iter()
            .any(|m| m.room_id == member.room_id && m.user_id == member.user_id);
        if duplicate {
            return Err(DomainError::AlreadyJoined);
        }
        self.members.insert(member.id, member.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: MemberId) -> RepoResult<Option<RoomMember>> {
        Ok(self.members.get(&id).map(|m| m.clone()))
    }

    async fn find_by_room_and_user(
        &self,
        room_id: &RoomId,
        user_id: &UserId,
    ) -> RepoResult<Option<RoomMember>> {
        Ok(self
            .members
            .iter()
            .find(|m| &m.room_id == room_id && &m.user_id == user_id)
            .map(|m| m.clone()))
    }

    async fn list_by_room(&self, room_id: &RoomId) -> RepoResult<Vec<RoomMember>> {
        let members: Vec<RoomMember> = self
            .members
            .iter()
            .filter(|m| &m.room_id == room_id)
            .map(|m| m.clone())
            .collect();
        Ok(Self::sorted_by_join_order(members))
    }

    async fn update(&self, member: &RoomMember) -> RepoResult<()> {
        match self.members.get_mut(&member.id) {
            Some(mut entry) => {
                *entry = member.clone();
                Ok(())
            }
            None => Err(DomainError::MemberNotFound(member.id)),
        }
    }

    async fn delete(&self, id: MemberId) -> RepoResult<()> {
        match self.members.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DomainError::MemberNotFound(id)),
        }
    }

    async fn delete_by_room(&self, room_id: &RoomId) -> RepoResult<u64> {
        // Counted inside the closure: map-wide len() before and after the
        // retain would also count unrelated concurrent inserts
        let mut removed = 0u64;
        self.members.retain(|_, m| {
            let keep = &m.room_id != room_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    async fn find_stale(
        &self,
        room_id: &RoomId,
        cutoff: DateTime<Utc>,
    ) -> RepoResult<Vec<RoomMember>> {
        let members: Vec<RoomMember> = self
            .members
            .iter()
            .filter(|m| &m.room_id == room_id && m.is_stale(cutoff))
            .map(|m| m.clone())
            .collect();
        Ok(Self::sorted_by_join_order(members))
    }

    async fn rooms_with_stale_members(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<RoomId>> {
        let rooms: HashSet<RoomId> = self
            .members
            .iter()
            .filter(|m| m.is_stale(cutoff))
            .map(|m| m.room_id.clone())
            .collect();
        Ok(rooms.into_iter().collect())
    }

    async fn count_by_room(&self, room_id: &RoomId) -> RepoResult<i64> {
        Ok(self
            .members
            .iter()
            .filter(|m| &m.room_id == room_id)
            .count() as i64)
    }
}

//! In-memory RoomRepository implementation.
//!
//! A `HashMap` behind a mutex stands in for the document store. The
//! versioned `update` gives the same effect as an atomic conditional update
//! on a single document: the mutation only lands if the stored version still
//! matches the one the caller read.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, Room, RoomRepository};

#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Arc<Mutex<HashMap<String, Room>>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(&self, room: Room) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        if rooms.contains_key(&room.id) {
            return Err(RepositoryError::Duplicate(room.id));
        }
        rooms.insert(room.id.clone(), room);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Room, RepositoryError> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }

    async fn find_by_creator(&self, created_by: &str) -> Result<Vec<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        Ok(rooms
            .values()
            .filter(|r| r.created_by == created_by)
            .cloned()
            .collect())
    }

    async fn find_active(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Room>, RepositoryError> {
        let rooms = self.rooms.lock().await;
        let mut active: Vec<Room> = rooms.values().filter(|r| r.is_active()).cloned().collect();
        // Newest first, like the document store's created_at index.
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, mut room: Room) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let stored = rooms
            .get(&room.id)
            .ok_or_else(|| RepositoryError::NotFound(room.id.clone()))?;

        if stored.version != room.version {
            return Err(RepositoryError::Conflict(room.id));
        }

        room.version += 1;
        rooms.insert(room.id.clone(), room.clone());
        Ok(room)
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        rooms.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_find_by_id() {
        // given (precondition):
        let repo = InMemoryRoomRepository::new();
        let room = Room::new("alice", 10);
        let id = room.id.clone();

        // when (operation):
        repo.create(room).await.unwrap();

        // then (expected result):
        let loaded = repo.find_by_id(&id).await.unwrap();
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.created_by, "alice");
    }

    #[tokio::test]
    async fn test_create_duplicate_id_fails() {
        // given (precondition):
        let repo = InMemoryRoomRepository::new();
        let room = Room::new("alice", 10);
        repo.create(room.clone()).await.unwrap();

        // when (operation):
        let result = repo.create(room.clone()).await;

        // then (expected result):
        assert_eq!(result, Err(RepositoryError::Duplicate(room.id)));
    }

    #[tokio::test]
    async fn test_find_missing_room_fails_not_found() {
        // given (precondition):
        let repo = InMemoryRoomRepository::new();

        // when (operation):
        let result = repo.find_by_id("missing").await;

        // then (expected result):
        assert_eq!(result, Err(RepositoryError::NotFound("missing".into())));
    }

    #[tokio::test]
    async fn test_update_is_compare_and_swap() {
        // given (precondition): two readers hold the same version
        let repo = InMemoryRoomRepository::new();
        let room = Room::new("alice", 10);
        repo.create(room.clone()).await.unwrap();
        let mut first = repo.find_by_id(&room.id).await.unwrap();
        let mut second = repo.find_by_id(&room.id).await.unwrap();

        // when (operation): both write back
        first.add_participant("a", "A", "").unwrap();
        let first_result = repo.update(first).await;
        second.add_participant("b", "B", "").unwrap();
        let second_result = repo.update(second).await;

        // then (expected result): the second write loses, nothing of it lands
        let updated = first_result.unwrap();
        assert_eq!(updated.version, 1);
        assert_eq!(second_result, Err(RepositoryError::Conflict(room.id.clone())));
        let stored = repo.find_by_id(&room.id).await.unwrap();
        assert_eq!(stored.active_participants().len(), 1);
        assert_eq!(stored.participants[0].user_id, "a");
    }

    #[tokio::test]
    async fn test_find_active_paginates_newest_first() {
        // given (precondition): three active rooms and one ended
        let repo = InMemoryRoomRepository::new();
        let mut ids = Vec::new();
        for i in 0..3 {
            let mut room = Room::new("alice", 10);
            room.created_at += chrono::Duration::seconds(i);
            ids.push(room.id.clone());
            repo.create(room).await.unwrap();
        }
        let mut ended = Room::new("bob", 10);
        ended.end();
        repo.create(ended).await.unwrap();

        // when (operation): first page of two
        let page = repo.find_active(2, 0).await.unwrap();

        // then (expected result): newest two, ended room excluded
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2]);
        assert_eq!(page[1].id, ids[1]);
        let rest = repo.find_active(2, 2).await.unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, ids[0]);
    }

    #[tokio::test]
    async fn test_find_by_creator_filters() {
        // given (precondition):
        let repo = InMemoryRoomRepository::new();
        repo.create(Room::new("alice", 10)).await.unwrap();
        repo.create(Room::new("alice", 10)).await.unwrap();
        repo.create(Room::new("bob", 10)).await.unwrap();

        // when (operation):
        let rooms = repo.find_by_creator("alice").await.unwrap();

        // then (expected result):
        assert_eq!(rooms.len(), 2);
        assert!(rooms.iter().all(|r| r.created_by == "alice"));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        // given (precondition):
        let repo = InMemoryRoomRepository::new();
        let room = Room::new("alice", 10);
        let id = room.id.clone();
        repo.create(room).await.unwrap();

        // when (operation):
        repo.delete(&id).await.unwrap();
        let again = repo.delete(&id).await;

        // then (expected result):
        assert!(again.is_ok());
        assert!(repo.find_by_id(&id).await.is_err());
    }
}

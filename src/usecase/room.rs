//! UseCase: room lifecycle.
//!
//! Thin orchestration over the [`Room`] aggregate: read, apply an aggregate
//! method, write back. All writes go through the repository's
//! compare-and-swap update; on a version conflict the whole
//! read-check-write cycle is retried, so two concurrent joins cannot race
//! past the capacity check.

use std::sync::Arc;

use crate::domain::{
    AppError, DEFAULT_ROOM_CAPACITY, Participant, RepositoryError, Room, RoomRepository,
};

/// Bounded retries for optimistic-concurrency conflicts.
const UPDATE_RETRY_LIMIT: usize = 3;

pub struct RoomUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl RoomUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_room(&self, created_by: &str) -> Result<Room, AppError> {
        let room = Room::new(created_by, DEFAULT_ROOM_CAPACITY);
        self.repository
            .create(room.clone())
            .await
            .map_err(|e| AppError::Internal(format!("failed to create room: {e}")))?;
        Ok(room)
    }

    pub async fn join_room(
        &self,
        room_id: &str,
        user_id: &str,
        user_name: &str,
        avatar: &str,
    ) -> Result<Room, AppError> {
        self.update_with_retry(room_id, |room| {
            if !room.is_active() {
                return Err(AppError::Validation("room has ended".into()));
            }
            room.add_participant(user_id, user_name, avatar)
                .map_err(|e| AppError::Validation(e.to_string()))
        })
        .await
    }

    /// Stamp the user's roster entry as left. A leave that empties the
    /// active roster ends the room.
    pub async fn leave_room(&self, room_id: &str, user_id: &str) -> Result<Room, AppError> {
        self.update_with_retry(room_id, |room| {
            room.remove_participant(user_id)
                .map_err(|e| AppError::Validation(e.to_string()))?;
            if room.active_participants().is_empty() {
                room.end();
            }
            Ok(())
        })
        .await
    }

    /// Force the room to `Ended`. Creator only.
    pub async fn end_room(&self, room_id: &str, user_id: &str) -> Result<(), AppError> {
        self.update_with_retry(room_id, |room| {
            if room.created_by != user_id {
                return Err(AppError::Forbidden(
                    "only the room creator can end the room".into(),
                ));
            }
            room.end();
            Ok(())
        })
        .await?;
        Ok(())
    }

    pub async fn room_details(&self, room_id: &str) -> Result<Room, AppError> {
        self.find(room_id).await
    }

    pub async fn active_participants(&self, room_id: &str) -> Result<Vec<Participant>, AppError> {
        let room = self.find(room_id).await?;
        Ok(room
            .active_participants()
            .into_iter()
            .cloned()
            .collect())
    }

    pub async fn list_active(&self, limit: usize, offset: usize) -> Result<Vec<Room>, AppError> {
        self.repository
            .find_active(limit, offset)
            .await
            .map_err(|e| AppError::Internal(format!("failed to list rooms: {e}")))
    }

    /// All rooms a user has created, ended ones included.
    pub async fn rooms_by_creator(&self, created_by: &str) -> Result<Vec<Room>, AppError> {
        self.repository
            .find_by_creator(created_by)
            .await
            .map_err(|e| AppError::Internal(format!("failed to list rooms: {e}")))
    }

    /// Attach the external call-session id, at most once. Re-attaching when
    /// one is already stored keeps the stored value and succeeds, so
    /// repeated "start call" requests stay idempotent.
    pub async fn set_session_id(&self, room_id: &str, session_id: &str) -> Result<Room, AppError> {
        self.update_with_retry(room_id, |room| {
            if room.call_session_id.is_none() {
                room.call_session_id = Some(session_id.to_string());
            }
            Ok(())
        })
        .await
    }

    async fn find(&self, room_id: &str) -> Result<Room, AppError> {
        self.repository.find_by_id(room_id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => AppError::NotFound("room not found".into()),
            other => AppError::Internal(format!("failed to load room: {other}")),
        })
    }

    /// Read-check-write with a bounded retry on version conflicts.
    async fn update_with_retry(
        &self,
        room_id: &str,
        mutate: impl Fn(&mut Room) -> Result<(), AppError>,
    ) -> Result<Room, AppError> {
        for _ in 0..UPDATE_RETRY_LIMIT {
            let mut room = self.find(room_id).await?;
            mutate(&mut room)?;

            match self.repository.update(room).await {
                Ok(updated) => return Ok(updated),
                Err(RepositoryError::Conflict(_)) => continue,
                Err(e) => {
                    return Err(AppError::Internal(format!("failed to update room: {e}")));
                }
            }
        }

        Err(AppError::Internal(
            "room update kept conflicting, giving up".into(),
        ))
    }
}

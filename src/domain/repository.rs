//! Repository trait definitions.
//!
//! The domain layer defines the data-access interfaces it needs; concrete
//! implementations live in the infrastructure layer (dependency inversion).
//! The usecase layer depends only on these traits.

use async_trait::async_trait;

use super::chat::ChatMessage;
use super::error::RepositoryError;
use super::room::Room;

/// Room persistence capability.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Store a new room. Fails with [`RepositoryError::Duplicate`] if the id
    /// is already taken.
    async fn create(&self, room: Room) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: &str) -> Result<Room, RepositoryError>;

    async fn find_by_creator(&self, created_by: &str) -> Result<Vec<Room>, RepositoryError>;

    async fn find_active(&self, limit: usize, offset: usize)
    -> Result<Vec<Room>, RepositoryError>;

    /// Compare-and-swap update: succeeds only when the stored version still
    /// matches `room.version`, and bumps the version on success. Fails with
    /// [`RepositoryError::Conflict`] otherwise, in which case the caller
    /// re-reads and retries.
    async fn update(&self, room: Room) -> Result<Room, RepositoryError>;

    /// Remove a room record outright. Idempotent; normal lifecycle only ever
    /// ends a room, deletion is an administrative operation.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;
}

/// Chat persistence capability: durable append plus paginated reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn create(&self, message: ChatMessage) -> Result<(), RepositoryError>;

    /// Page through a room's history. The page is selected most-recent-first
    /// and returned in chronological order.
    async fn find_by_room_id(
        &self,
        room_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError>;
}

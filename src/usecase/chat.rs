//! UseCase: chat message persistence and history.

use std::sync::Arc;

use crate::domain::{AppError, ChatMessage, ChatRepository};

pub struct ChatUseCase {
    repository: Arc<dyn ChatRepository>,
}

impl ChatUseCase {
    pub fn new(repository: Arc<dyn ChatRepository>) -> Self {
        Self { repository }
    }

    /// Durably append one message.
    ///
    /// An empty message body is rejected before anything is stored, so the
    /// hub never relays it either.
    pub async fn send_message(
        &self,
        room_id: &str,
        user_id: &str,
        user_name: &str,
        message: &str,
    ) -> Result<ChatMessage, AppError> {
        if message.is_empty() {
            return Err(AppError::Validation("message cannot be empty".into()));
        }

        let message = ChatMessage::new(room_id, user_id, user_name, message);
        self.repository
            .create(message.clone())
            .await
            .map_err(|e| AppError::Internal(format!("failed to save message: {e}")))?;

        Ok(message)
    }

    /// Page through a room's history, chronological within the page.
    pub async fn messages(
        &self,
        room_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ChatMessage>, AppError> {
        self.repository
            .find_by_room_id(room_id, limit, offset)
            .await
            .map_err(|e| AppError::Internal(format!("failed to retrieve messages: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repository::inmemory::InMemoryChatRepository;

    fn create_test_usecase() -> ChatUseCase {
        ChatUseCase::new(Arc::new(InMemoryChatRepository::new()))
    }

    #[tokio::test]
    async fn test_send_message_success() {
        // given (precondition):
        let usecase = create_test_usecase();

        // when (operation):
        let result = usecase.send_message("r1", "alice", "Alice", "hi").await;

        // then (expected result):
        let message = result.unwrap();
        assert_eq!(message.room_id, "r1");
        assert_eq!(message.user_id, "alice");
        assert_eq!(message.message, "hi");

        let history = usecase.messages("r1", 50, 0).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0], message);
    }

    #[tokio::test]
    async fn test_empty_message_is_rejected_before_persistence() {
        // given (precondition):
        let usecase = create_test_usecase();

        // when (operation):
        let result = usecase.send_message("r1", "alice", "Alice", "").await;

        // then (expected result): validation error, nothing stored
        assert_eq!(
            result,
            Err(AppError::Validation("message cannot be empty".into()))
        );
        assert!(usecase.messages("r1", 50, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_messages_are_scoped_per_room() {
        // given (precondition): messages in two rooms
        let usecase = create_test_usecase();
        usecase.send_message("r1", "alice", "Alice", "one").await.unwrap();
        usecase.send_message("r2", "bob", "Bob", "two").await.unwrap();

        // when (operation):
        let history = usecase.messages("r1", 50, 0).await.unwrap();

        // then (expected result):
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, "one");
    }
}

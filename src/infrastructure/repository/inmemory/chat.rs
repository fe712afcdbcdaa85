//! In-memory ChatRepository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ChatMessage, ChatRepository, RepositoryError};

#[derive(Default)]
pub struct InMemoryChatRepository {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
}

impl InMemoryChatRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatRepository for InMemoryChatRepository {
    async fn create(&self, message: ChatMessage) -> Result<(), RepositoryError> {
        let mut messages = self.messages.lock().await;
        messages.push(message);
        Ok(())
    }

    async fn find_by_room_id(
        &self,
        room_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let messages = self.messages.lock().await;
        let mut page: Vec<ChatMessage> = messages
            .iter()
            .filter(|m| m.room_id == room_id)
            .cloned()
            .collect();

        // Select the page newest-first, then flip it to chronological order.
        page.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        let mut page: Vec<ChatMessage> = page.into_iter().skip(offset).take(limit).collect();
        page.reverse();
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn message_at(room_id: &str, text: &str, seconds: i64) -> ChatMessage {
        let mut message = ChatMessage::new(room_id, "alice", "Alice", text);
        message.timestamp += Duration::seconds(seconds);
        message
    }

    #[tokio::test]
    async fn test_page_is_most_recent_in_chronological_order() {
        // given (precondition): five messages, m0 oldest
        let repo = InMemoryChatRepository::new();
        for i in 0..5 {
            repo.create(message_at("r1", &format!("m{i}"), i)).await.unwrap();
        }

        // when (operation): latest page of three
        let page = repo.find_by_room_id("r1", 3, 0).await.unwrap();

        // then (expected result): the three newest, oldest of them first
        let texts: Vec<&str> = page.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["m2", "m3", "m4"]);

        // the next page continues backwards in time
        let older = repo.find_by_room_id("r1", 3, 3).await.unwrap();
        let texts: Vec<&str> = older.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["m0", "m1"]);
    }

    #[tokio::test]
    async fn test_history_is_scoped_per_room() {
        // given (precondition):
        let repo = InMemoryChatRepository::new();
        repo.create(message_at("r1", "one", 0)).await.unwrap();
        repo.create(message_at("r2", "two", 1)).await.unwrap();

        // when (operation):
        let page = repo.find_by_room_id("r1", 50, 0).await.unwrap();

        // then (expected result):
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].message, "one");
    }
}

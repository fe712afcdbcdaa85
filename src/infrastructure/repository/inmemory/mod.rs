//! In-memory repository implementations.

pub mod chat;
pub mod room;

pub use chat::InMemoryChatRepository;
pub use room::InMemoryRoomRepository;

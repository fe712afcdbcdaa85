//! Domain layer: entities, invariants, and capability traits.

pub mod auth;
pub mod call;
pub mod chat;
pub mod error;
pub mod repository;
pub mod room;

pub use auth::{Identity, TokenVerifier};
pub use call::{CallSession, CallSessionProvider, CallToken};
pub use chat::ChatMessage;
pub use error::{AppError, RepositoryError};
pub use repository::{ChatRepository, RoomRepository};
pub use room::{DEFAULT_ROOM_CAPACITY, Participant, Room, RoomError, RoomStatus};

//! Usecase layer: orchestration over the domain aggregates and the
//! capability traits.

pub mod call;
pub mod chat;
pub mod room;

pub use call::CallUseCase;
pub use chat::ChatUseCase;
pub use room::RoomUseCase;

//! UI layer: HTTP routing, WebSocket acceptance, and server execution.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::{Server, router};
pub use state::AppState;

//! Infrastructure layer: concrete implementations of the domain's
//! capability traits.

pub mod auth;
pub mod calls;
pub mod repository;

pub use auth::InMemoryTokenVerifier;
pub use calls::HttpCallSessionProvider;

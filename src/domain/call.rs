//! External call-session capability.
//!
//! The actual media sessions live with a third-party WebRTC provider. The
//! server only creates sessions and mints join tokens through this trait;
//! the HTTP client implementation lives in the infrastructure layer.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSession {
    pub session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Capability for creating provider-side call sessions and join tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CallSessionProvider: Send + Sync {
    /// Create a new provider session for a room.
    async fn create_session(&self, room_id: &str) -> Result<CallSession, AppError>;

    /// Mint a short-lived token for joining an existing session.
    async fn mint_token(&self, session_id: &str) -> Result<CallToken, AppError>;
}

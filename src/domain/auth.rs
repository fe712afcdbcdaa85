//! Identity verification capability.
//!
//! Credential issuance and storage live outside this crate; the server only
//! consumes an opaque "verify token, get identity" capability. The concrete
//! implementation is provided by the infrastructure layer (dependency
//! inversion, same as the repository traits).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::AppError;

/// Verified user identity attached to a request or connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub name: String,
}

/// Token verification capability consumed by the UI layer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Resolve an opaque bearer token to a verified identity.
    ///
    /// Fails with [`AppError::Unauthorized`] for unknown or expired tokens.
    async fn verify(&self, token: &str) -> Result<Identity, AppError>;
}

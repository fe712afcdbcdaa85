//! In-memory token verifier.
//!
//! Stands in for the external credential service: tokens issued here are
//! opaque random strings mapped to a verified identity. The rest of the
//! server only sees the [`TokenVerifier`] trait, so swapping in a real JWT
//! verifier touches nothing but the wiring.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::{AppError, Identity, TokenVerifier};

#[derive(Default)]
pub struct InMemoryTokenVerifier {
    tokens: Arc<Mutex<HashMap<String, Identity>>>,
}

impl InMemoryTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue an opaque bearer token for an identity.
    pub async fn issue(&self, identity: Identity) -> String {
        let token = Uuid::new_v4().to_string();
        let mut tokens = self.tokens.lock().await;
        tokens.insert(token.clone(), identity);
        token
    }
}

#[async_trait]
impl TokenVerifier for InMemoryTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AppError> {
        let tokens = self.tokens.lock().await;
        tokens
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("invalid or expired token".into()))
    }
}

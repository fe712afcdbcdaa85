//! Shared application state.

use std::sync::Arc;

use serde::Deserialize;

use crate::domain::TokenVerifier;
use crate::hub::Hub;
use crate::infrastructure::InMemoryTokenVerifier;
use crate::usecase::{CallUseCase, ChatUseCase, RoomUseCase};

/// Query parameters for the WebSocket connection.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub token: String,
}

pub struct AppState {
    pub rooms: Arc<RoomUseCase>,
    pub chat: Arc<ChatUseCase>,
    pub calls: Arc<CallUseCase>,
    pub hub: Hub,
    pub verifier: Arc<dyn TokenVerifier>,
    /// Development token issuer backing `POST /api/v1/auth/token`. Stands in
    /// for the external credential service.
    pub token_issuer: Arc<InMemoryTokenVerifier>,
}

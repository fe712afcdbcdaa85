//! UseCase: external call sessions.
//!
//! A room gets at most one provider-side session. The first "start call"
//! creates one and memoizes its id on the room; later requests reuse it
//! instead of creating duplicates.

use std::sync::Arc;

use crate::domain::{AppError, CallSession, CallSessionProvider, CallToken};

use super::room::RoomUseCase;

pub struct CallUseCase {
    rooms: Arc<RoomUseCase>,
    provider: Arc<dyn CallSessionProvider>,
}

impl CallUseCase {
    pub fn new(rooms: Arc<RoomUseCase>, provider: Arc<dyn CallSessionProvider>) -> Self {
        Self { rooms, provider }
    }

    /// Create or reuse the call session for a room.
    pub async fn start_session(&self, room_id: &str) -> Result<CallSession, AppError> {
        let room = self.rooms.room_details(room_id).await?;

        if let Some(session_id) = room.call_session_id {
            tracing::debug!(room_id, %session_id, "reusing existing call session");
            return Ok(CallSession { session_id });
        }

        let session = self.provider.create_session(room_id).await?;
        let room = self
            .rooms
            .set_session_id(room_id, &session.session_id)
            .await?;

        // A concurrent starter may have attached a different session first;
        // the stored value wins either way.
        match room.call_session_id {
            Some(session_id) => Ok(CallSession { session_id }),
            None => Ok(session),
        }
    }

    /// Mint a short-lived join token for an existing session.
    pub async fn session_token(&self, session_id: &str) -> Result<CallToken, AppError> {
        self.provider.mint_token(session_id).await
    }
}

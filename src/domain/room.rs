//! Room aggregate.
//!
//! The aggregate owns the lifecycle invariants: the number of *active*
//! participants never exceeds the capacity, the roster is append-only
//! (leaving stamps `left_at`, it never deletes the entry), and `Ended` is a
//! terminal status. Callers mutate a `Room` only through the methods here,
//! so no caller path can violate the invariants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Default participant capacity for newly created rooms.
pub const DEFAULT_ROOM_CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Active,
    Ended,
}

/// One roster entry. A user may appear multiple times historically (join,
/// leave, re-join); at most one entry per user has no `left_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user_id: String,
    pub name: String,
    pub avatar: String,
    pub joined_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_at: Option<DateTime<Utc>>,
}

impl Participant {
    pub fn is_active(&self) -> bool {
        self.left_at.is_none()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    #[error("room is at maximum capacity")]
    AtCapacity,
    #[error("user is already in the room")]
    AlreadyJoined,
    #[error("participant not found in room")]
    ParticipantNotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub created_by: String,
    /// External call-session identifier, attached at most once.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_session_id: Option<String>,
    pub status: RoomStatus,
    pub participants: Vec<Participant>,
    pub max_capacity: usize,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Optimistic-concurrency counter, bumped by the repository on every
    /// successful update. Not part of the client-facing representation.
    #[serde(default)]
    pub version: u64,
}

impl Room {
    pub fn new(created_by: impl Into<String>, max_capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_by: created_by.into(),
            call_session_id: None,
            status: RoomStatus::Active,
            participants: Vec::new(),
            max_capacity,
            created_at: Utc::now(),
            ended_at: None,
            version: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RoomStatus::Active
    }

    /// Roster entries that have not left yet.
    pub fn active_participants(&self) -> Vec<&Participant> {
        self.participants.iter().filter(|p| p.is_active()).collect()
    }

    /// Append a roster entry for `user_id`.
    ///
    /// Capacity is checked against active entries only, so a seat freed by a
    /// leave can be taken again. A user with an entry still marked active
    /// must leave before re-joining.
    pub fn add_participant(
        &mut self,
        user_id: impl Into<String>,
        name: impl Into<String>,
        avatar: impl Into<String>,
    ) -> Result<(), RoomError> {
        let user_id = user_id.into();

        if self
            .participants
            .iter()
            .any(|p| p.user_id == user_id && p.is_active())
        {
            return Err(RoomError::AlreadyJoined);
        }

        if self.active_participants().len() >= self.max_capacity {
            return Err(RoomError::AtCapacity);
        }

        self.participants.push(Participant {
            user_id,
            name: name.into(),
            avatar: avatar.into(),
            joined_at: Utc::now(),
            left_at: None,
        });

        Ok(())
    }

    /// Stamp `left_at` on the user's active roster entry.
    pub fn remove_participant(&mut self, user_id: &str) -> Result<(), RoomError> {
        match self
            .participants
            .iter_mut()
            .find(|p| p.user_id == user_id && p.is_active())
        {
            Some(p) => {
                p.left_at = Some(Utc::now());
                Ok(())
            }
            None => Err(RoomError::ParticipantNotFound),
        }
    }

    /// Transition to `Ended` and stamp the end time. Terminal.
    pub fn end(&mut self) {
        self.status = RoomStatus::Ended;
        self.ended_at = Some(Utc::now());
    }
}

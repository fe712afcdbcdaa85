//! Connection session handles.
//!
//! One [`SessionHandle`] exists per live connection. The hub owns the handle
//! from registration to unregistration; the connection's write loop owns the
//! matching receiver and drains it strictly FIFO. The queue is bounded: a
//! member that cannot keep up is dropped by the hub instead of blocking the
//! broadcaster.

use tokio::sync::mpsc;
use uuid::Uuid;

/// Bound on each session's outbound queue.
pub const OUTBOUND_QUEUE_CAPACITY: usize = 256;

pub type SessionId = Uuid;

/// Identity of a session, kept by the connection task after the handle
/// itself has moved into the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: SessionId,
    pub room_id: String,
    pub user_id: String,
}

/// Hub-side handle to one live connection.
///
/// Dropping the handle closes the outbound queue, which terminates the
/// connection's write loop.
#[derive(Debug)]
pub struct SessionHandle {
    info: SessionInfo,
    sender: mpsc::Sender<String>,
}

impl SessionHandle {
    pub fn new(
        room_id: impl Into<String>,
        user_id: impl Into<String>,
    ) -> (Self, mpsc::Receiver<String>) {
        Self::with_queue_capacity(room_id, user_id, OUTBOUND_QUEUE_CAPACITY)
    }

    /// Like [`SessionHandle::new`] with an explicit queue bound. Used by
    /// tests that need to saturate the queue quickly.
    pub fn with_queue_capacity(
        room_id: impl Into<String>,
        user_id: impl Into<String>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let handle = Self {
            info: SessionInfo {
                id: Uuid::new_v4(),
                room_id: room_id.into(),
                user_id: user_id.into(),
            },
            sender,
        };
        (handle, receiver)
    }

    pub fn info(&self) -> &SessionInfo {
        &self.info
    }

    /// Non-blocking enqueue of a serialized frame.
    pub(crate) fn try_send(
        &self,
        frame: String,
    ) -> Result<(), mpsc::error::TrySendError<String>> {
        self.sender.try_send(frame)
    }
}

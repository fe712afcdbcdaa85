//! Connection registry.
//!
//! All live connections are grouped by room in a single map owned by one
//! [`HubRunner`] task. Register, unregister, and broadcast are submitted as
//! events on a bounded channel and applied serially, so the map needs no
//! lock and join/leave/broadcast for a room are applied in submission order.
//! A separate narrow mutex holds a per-room occupancy snapshot for read
//! paths outside the runner; it is locked only long enough to copy.
//!
//! Backpressure: fan-out enqueues with `try_send`. A member whose queue is
//! full is forcibly unregistered and announced as left, so one stalled
//! consumer can never delay delivery to the rest of the room.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};

use crate::usecase::ChatUseCase;

use super::message::{Envelope, FrameKind};
use super::session::{SessionHandle, SessionId, SessionInfo};

/// Bound on the hub's event queue.
pub const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug)]
enum HubEvent {
    Register(SessionHandle),
    Unregister(SessionInfo),
    Broadcast(Envelope),
}

/// Cloneable handle for submitting hub events and reading occupancy.
#[derive(Clone)]
pub struct Hub {
    events: mpsc::Sender<HubEvent>,
    occupancy: Arc<Mutex<HashMap<String, usize>>>,
    chat: Arc<ChatUseCase>,
}

impl Hub {
    /// Create the hub handle and its runner. The caller spawns
    /// [`HubRunner::run`] as the single task that owns all registry state.
    pub fn new(chat: Arc<ChatUseCase>) -> (Self, HubRunner) {
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let occupancy = Arc::new(Mutex::new(HashMap::new()));
        let hub = Self {
            events: events_tx,
            occupancy: occupancy.clone(),
            chat,
        };
        let runner = HubRunner {
            events: events_rx,
            rooms: HashMap::new(),
            occupancy,
        };
        (hub, runner)
    }

    /// Hand a session to the registry. The hub owns the handle from here on.
    pub async fn register(&self, session: SessionHandle) {
        self.submit(HubEvent::Register(session)).await;
    }

    /// Remove a session from its room. Idempotent: unregistering a session
    /// the registry no longer holds is a no-op.
    pub async fn unregister(&self, info: &SessionInfo) {
        self.submit(HubEvent::Unregister(info.clone())).await;
    }

    /// Fan a message out to every current member of its target room.
    pub async fn broadcast(&self, message: Envelope) {
        self.submit(HubEvent::Broadcast(message)).await;
    }

    /// Interpret one inbound frame from a connection's read loop.
    ///
    /// Chat frames are durably appended first and re-broadcast only on a
    /// successful append; signal frames are relayed verbatim; everything
    /// else is dropped. A malformed frame is logged and dropped without
    /// punishing the connection. Room and user are always taken from the
    /// session, never from the frame, so a client cannot inject into
    /// another room.
    pub async fn handle_frame(&self, session: &SessionInfo, text: &str) {
        let envelope: Envelope = match serde_json::from_str(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(user_id = %session.user_id, error = %e, "dropping malformed frame");
                return;
            }
        };

        match envelope.kind {
            FrameKind::ChatMessage => {
                let Some((message, user_name)) = envelope.chat_body() else {
                    tracing::debug!(user_id = %session.user_id, "chat frame without message body");
                    return;
                };
                match self
                    .chat
                    .send_message(&session.room_id, &session.user_id, user_name, message)
                    .await
                {
                    Ok(_) => {
                        self.broadcast(Envelope::chat(
                            &session.room_id,
                            &session.user_id,
                            envelope.payload.clone(),
                        ))
                        .await;
                    }
                    Err(e) => {
                        // At-most-once: an unsaved message is never relayed.
                        tracing::warn!(
                            room_id = %session.room_id,
                            user_id = %session.user_id,
                            error = %e,
                            "failed to save chat message, not relaying"
                        );
                    }
                }
            }
            FrameKind::Signal => {
                self.broadcast(Envelope {
                    kind: FrameKind::Signal,
                    room_id: session.room_id.clone(),
                    user_id: session.user_id.clone(),
                    payload: envelope.payload,
                })
                .await;
            }
            FrameKind::ParticipantJoined | FrameKind::ParticipantLeft | FrameKind::Unknown => {
                tracing::debug!(
                    user_id = %session.user_id,
                    kind = ?envelope.kind,
                    "ignoring frame kind from client"
                );
            }
        }
    }

    /// Copy of the current room → live-connection-count map.
    pub async fn occupancy_snapshot(&self) -> HashMap<String, usize> {
        self.occupancy.lock().await.clone()
    }

    async fn submit(&self, event: HubEvent) {
        if self.events.send(event).await.is_err() {
            tracing::error!("hub runner is gone, dropping event");
        }
    }
}

/// The single task that owns the room → sessions map.
pub struct HubRunner {
    events: mpsc::Receiver<HubEvent>,
    rooms: HashMap<String, HashMap<SessionId, SessionHandle>>,
    occupancy: Arc<Mutex<HashMap<String, usize>>>,
}

impl HubRunner {
    /// Serially apply hub events until every [`Hub`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(event) = self.events.recv().await {
            match event {
                HubEvent::Register(session) => self.register(session).await,
                HubEvent::Unregister(info) => self.unregister(info).await,
                HubEvent::Broadcast(message) => self.broadcast_to_room(message).await,
            }
        }
        tracing::debug!("hub runner stopped");
    }

    async fn register(&mut self, session: SessionHandle) {
        let info = session.info().clone();
        self.rooms
            .entry(info.room_id.clone())
            .or_default()
            .insert(info.id, session);
        self.sync_occupancy(&info.room_id).await;
        tracing::info!(room_id = %info.room_id, user_id = %info.user_id, "session registered");

        // Announced to the whole room, the new session included.
        self.broadcast_to_room(Envelope::participant_joined(&info.room_id, &info.user_id))
            .await;
    }

    async fn unregister(&mut self, info: SessionInfo) {
        let removed = match self.rooms.get_mut(&info.room_id) {
            Some(members) => {
                let removed = members.remove(&info.id).is_some();
                if members.is_empty() {
                    self.rooms.remove(&info.room_id);
                }
                removed
            }
            None => false,
        };

        // Already gone (e.g. dropped for a full queue): announce nothing.
        if !removed {
            return;
        }

        self.sync_occupancy(&info.room_id).await;
        tracing::info!(room_id = %info.room_id, user_id = %info.user_id, "session unregistered");

        self.broadcast_to_room(Envelope::participant_left(&info.room_id, &info.user_id))
            .await;
    }

    /// Serialize once, enqueue to every member without blocking. Members
    /// whose queue is full or closed are removed and announced as left; the
    /// worklist terminates because each pass strictly shrinks the room.
    async fn broadcast_to_room(&mut self, message: Envelope) {
        let mut pending = vec![message];

        while let Some(message) = pending.pop() {
            let frame = match serde_json::to_string(&message) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize broadcast frame");
                    continue;
                }
            };

            let Some(members) = self.rooms.get(&message.room_id) else {
                continue;
            };

            let mut dead: Vec<SessionId> = Vec::new();
            for (id, session) in members {
                match session.try_send(frame.clone()) {
                    Ok(()) => {}
                    Err(mpsc::error::TrySendError::Full(_)) => {
                        tracing::warn!(
                            room_id = %message.room_id,
                            user_id = %session.info().user_id,
                            "outbound queue full, dropping slow session"
                        );
                        dead.push(*id);
                    }
                    Err(mpsc::error::TrySendError::Closed(_)) => {
                        tracing::debug!(
                            room_id = %message.room_id,
                            user_id = %session.info().user_id,
                            "outbound queue closed, dropping session"
                        );
                        dead.push(*id);
                    }
                }
            }

            if dead.is_empty() {
                continue;
            }

            if let Some(members) = self.rooms.get_mut(&message.room_id) {
                for id in dead {
                    if let Some(session) = members.remove(&id) {
                        let info = session.info();
                        pending.push(Envelope::participant_left(&info.room_id, &info.user_id));
                    }
                }
                if members.is_empty() {
                    self.rooms.remove(&message.room_id);
                }
            }
            self.sync_occupancy(&message.room_id).await;
        }
    }

    async fn sync_occupancy(&self, room_id: &str) {
        let count = self.rooms.get(room_id).map(|m| m.len());
        let mut occupancy = self.occupancy.lock().await;
        match count {
            Some(count) => {
                occupancy.insert(room_id.to_string(), count);
            }
            None => {
                occupancy.remove(room_id);
            }
        }
    }
}

//! WebSocket connection handler.
//!
//! The token is verified before the upgrade, so an unauthorized client is
//! rejected with 401 while the request is still plain HTTP. After the
//! upgrade, one task reads inbound frames and one drains the session's
//! outbound queue; whichever finishes first aborts the other, so a failure
//! in either direction tears down the whole connection and unregisters it.

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::domain::AppError;
use crate::hub::SessionHandle;

use super::super::state::{AppState, ConnectQuery};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, AppError> {
    let identity = state.verifier.verify(&query.token).await?;
    tracing::info!(room_id, user_id = %identity.user_id, "websocket authenticated");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, room_id, identity.user_id)))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, room_id: String, user_id: String) {
    let (session, rx) = SessionHandle::new(room_id, user_id);
    let info = session.info().clone();

    // The hub owns the handle from here; this task keeps only the info and
    // the receiving end of the outbound queue.
    state.hub.register(session).await;

    let (sender, receiver) = socket.split();

    let hub = state.hub.clone();
    let read_info = info.clone();
    let mut recv_task = tokio::spawn(read_loop(receiver, hub, read_info));
    let mut send_task = tokio::spawn(write_loop(sender, rx));

    // If either loop completes, abort the other.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.hub.unregister(&info).await;
    tracing::info!(room_id = %info.room_id, user_id = %info.user_id, "connection closed");
}

/// Sole reader of the transport. Hands each text frame to the hub and exits
/// on close or transport error.
async fn read_loop(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    hub: crate::hub::Hub,
    info: crate::hub::SessionInfo,
) {
    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                hub.handle_frame(&info, text.as_str()).await;
            }
            Ok(Message::Close(_)) => {
                tracing::debug!(user_id = %info.user_id, "peer requested close");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(user_id = %info.user_id, error = %e, "websocket read error");
                break;
            }
        }
    }
}

/// Sole writer of the transport. Drains the outbound queue in FIFO order
/// and exits when the hub closes the queue or a write fails.
async fn write_loop(
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<String>,
) {
    while let Some(frame) = rx.recv().await {
        if sender.send(Message::Text(frame.into())).await.is_err() {
            break;
        }
    }
}

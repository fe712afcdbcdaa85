//! REST handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::domain::{AppError, CallToken, ChatMessage, Identity, Participant, Room};

use super::super::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
            kind: self.kind().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Resolve the `Authorization: Bearer` header to a verified identity.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Identity, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("missing bearer token".into()))?;

    state.verifier.verify(token).await
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Room-occupancy snapshot of the hub, for debugging.
pub async fn debug_hub(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let occupancy = state.hub.occupancy_snapshot().await;
    Json(serde_json::json!({"rooms": occupancy}))
}

// ---- auth ----

#[derive(Debug, Deserialize)]
pub struct IssueTokenRequest {
    pub user_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct IssueTokenResponse {
    pub token: String,
}

/// Development stand-in for the external credential service.
pub async fn issue_token(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IssueTokenRequest>,
) -> Result<Json<IssueTokenResponse>, AppError> {
    if request.user_id.is_empty() {
        return Err(AppError::Validation("user_id cannot be empty".into()));
    }

    let token = state
        .token_issuer
        .issue(Identity {
            user_id: request.user_id,
            name: request.name,
        })
        .await;

    Ok(Json(IssueTokenResponse { token }))
}

// ---- rooms ----

pub async fn create_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let identity = authenticate(&state, &headers).await?;
    let room = state.rooms.create_room(&identity.user_id).await?;
    tracing::info!(room_id = %room.id, created_by = %identity.user_id, "room created");
    Ok((StatusCode::CREATED, Json(room)))
}

#[derive(Debug, Deserialize)]
pub struct ListRoomsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// Restrict to rooms created by this user; includes ended rooms.
    pub created_by: Option<String>,
}

pub async fn list_rooms(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<ListRoomsQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    authenticate(&state, &headers).await?;
    let rooms = match query.created_by {
        Some(creator) => state.rooms.rooms_by_creator(&creator).await?,
        None => {
            state
                .rooms
                .list_active(query.limit.unwrap_or(50), query.offset.unwrap_or(0))
                .await?
        }
    };
    Ok(Json(rooms))
}

pub async fn get_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, AppError> {
    authenticate(&state, &headers).await?;
    let room = state.rooms.room_details(&room_id).await?;
    Ok(Json(room))
}

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    pub user_name: String,
    #[serde(default)]
    pub avatar: String,
}

pub async fn join_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Json(request): Json<JoinRoomRequest>,
) -> Result<Json<Room>, AppError> {
    let identity = authenticate(&state, &headers).await?;
    let room = state
        .rooms
        .join_room(&room_id, &identity.user_id, &request.user_name, &request.avatar)
        .await?;
    Ok(Json(room))
}

pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<Json<Room>, AppError> {
    let identity = authenticate(&state, &headers).await?;
    let room = state.rooms.leave_room(&room_id, &identity.user_id).await?;
    Ok(Json(room))
}

pub async fn end_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let identity = authenticate(&state, &headers).await?;
    state.rooms.end_room(&room_id, &identity.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_participants(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<Participant>>, AppError> {
    authenticate(&state, &headers).await?;
    let participants = state.rooms.active_participants(&room_id).await?;
    Ok(Json(participants))
}

// ---- chat ----

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

pub async fn get_messages(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    authenticate(&state, &headers).await?;
    let messages = state
        .chat
        .messages(&room_id, query.limit.unwrap_or(50), query.offset.unwrap_or(0))
        .await?;
    Ok(Json(messages))
}

// ---- calls ----

#[derive(Debug, Deserialize)]
pub struct CreateCallSessionRequest {
    pub room_id: String,
}

#[derive(Debug, Serialize)]
pub struct CreateCallSessionResponse {
    pub session_id: String,
}

pub async fn create_call_session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateCallSessionRequest>,
) -> Result<Json<CreateCallSessionResponse>, AppError> {
    authenticate(&state, &headers).await?;
    if request.room_id.is_empty() {
        return Err(AppError::Validation("room_id cannot be empty".into()));
    }

    let session = state.calls.start_session(&request.room_id).await?;
    Ok(Json(CreateCallSessionResponse {
        session_id: session.session_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateCallTokenRequest {
    pub session_id: String,
}

pub async fn create_call_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CreateCallTokenRequest>,
) -> Result<Json<CallToken>, AppError> {
    authenticate(&state, &headers).await?;
    if request.session_id.is_empty() {
        return Err(AppError::Validation("session_id cannot be empty".into()));
    }

    let token = state.calls.session_token(&request.session_id).await?;
    Ok(Json(token))
}

//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use super::handler::http::{
    create_call_session, create_call_token, create_room, debug_hub, end_room, get_messages,
    get_participants, get_room, health_check, issue_token, join_room, leave_room, list_rooms,
};
use super::handler::websocket::websocket_handler;
use super::signal::shutdown_signal;
use super::state::AppState;

/// Build the application router. Exposed separately from [`Server::run`] so
/// tests can serve it on an ephemeral listener.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/token", post(issue_token))
        .route("/rooms", post(create_room).get(list_rooms))
        .route("/rooms/{id}", get(get_room).delete(end_room))
        .route("/rooms/{id}/join", post(join_room))
        .route("/rooms/{id}/leave", post(leave_room))
        .route("/rooms/{id}/participants", get(get_participants))
        .route("/rooms/{id}/messages", get(get_messages))
        .route("/calls/sessions", post(create_call_session))
        .route("/calls/sessions/token", post(create_call_token))
        .route("/ws/room/{id}", get(websocket_handler));

    Router::new()
        .route("/health", get(health_check))
        .route("/debug/hub", get(debug_hub))
        .nest("/api/v1", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The HTTP and WebSocket server.
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Run until Ctrl+C or SIGTERM.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(self.state);

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!("huddle server listening on {}", listener.local_addr()?);
        tracing::info!("Connect to: ws://{}/api/v1/ws/room/{{id}}", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

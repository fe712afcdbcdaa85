//! Integration tests over real sockets: the axum app is served on an
//! ephemeral port and exercised with reqwest and tokio-tungstenite.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use huddle_server::{
    domain::Identity,
    hub::Hub,
    infrastructure::{
        HttpCallSessionProvider, InMemoryTokenVerifier,
        repository::inmemory::{InMemoryChatRepository, InMemoryRoomRepository},
    },
    ui::{AppState, router},
    usecase::{CallUseCase, ChatUseCase, RoomUseCase},
};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite};

type WsRead = futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;
type WsWrite = futures_util::stream::SplitSink<
    WebSocketStream<MaybeTlsStream<TcpStream>>,
    tungstenite::Message,
>;

/// Serve a fresh application on an ephemeral port.
async fn spawn_server() -> (SocketAddr, Arc<AppState>) {
    let rooms = Arc::new(RoomUseCase::new(Arc::new(InMemoryRoomRepository::new())));
    let chat = Arc::new(ChatUseCase::new(Arc::new(InMemoryChatRepository::new())));
    let calls = Arc::new(CallUseCase::new(
        rooms.clone(),
        Arc::new(HttpCallSessionProvider::new("", "")),
    ));
    let token_issuer = Arc::new(InMemoryTokenVerifier::new());

    let (hub, runner) = Hub::new(chat.clone());
    tokio::spawn(runner.run());

    let state = Arc::new(AppState {
        rooms,
        chat,
        calls,
        hub,
        verifier: token_issuer.clone(),
        token_issuer,
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().unwrap();
    let app = router(state.clone());
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    (addr, state)
}

async fn connect(
    addr: SocketAddr,
    room_id: &str,
    token: &str,
) -> Result<(WsWrite, WsRead), tungstenite::Error> {
    let url = format!("ws://{addr}/api/v1/ws/room/{room_id}?token={token}");
    let (socket, _response) = connect_async(url).await?;
    Ok(socket.split())
}

/// Read the next JSON frame, with a timeout.
async fn next_frame(read: &mut WsRead) -> Value {
    let message = tokio::time::timeout(Duration::from_secs(2), read.next())
        .await
        .expect("timed out waiting for frame")
        .expect("connection closed unexpectedly")
        .expect("websocket error");
    serde_json::from_str(message.to_text().expect("non-text frame")).expect("invalid frame JSON")
}

#[tokio::test]
async fn test_unauthorized_connection_is_rejected_before_upgrade() {
    // given (precondition):
    let (addr, _state) = spawn_server().await;

    // when (operation): connecting with a token nobody issued
    let result = connect(addr, "some-room", "bogus").await;

    // then (expected result): the handshake itself fails with 401
    match result {
        Err(tungstenite::Error::Http(response)) => {
            assert_eq!(response.status(), 401);
        }
        other => panic!("expected HTTP 401 rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_chat_is_persisted_and_fanned_out_to_the_room_only() {
    // given (precondition): alice and bob in r1, carol in r2
    let (addr, state) = spawn_server().await;
    let alice_token = issue(&state, "alice", "Alice").await;
    let bob_token = issue(&state, "bob", "Bob").await;
    let carol_token = issue(&state, "carol", "Carol").await;

    let (mut alice_tx, mut alice_rx) = connect(addr, "r1", &alice_token).await.unwrap();
    assert_eq!(next_frame(&mut alice_rx).await["user_id"], "alice");

    let (_bob_tx, mut bob_rx) = connect(addr, "r1", &bob_token).await.unwrap();
    assert_eq!(next_frame(&mut alice_rx).await["user_id"], "bob");
    assert_eq!(next_frame(&mut bob_rx).await["user_id"], "bob");

    let (_carol_tx, mut carol_rx) = connect(addr, "r2", &carol_token).await.unwrap();
    assert_eq!(next_frame(&mut carol_rx).await["user_id"], "carol");

    // when (operation): alice sends a chat frame
    let frame = json!({
        "type": "chat_message",
        "room_id": "r1",
        "user_id": "alice",
        "payload": {"message": "hi", "user_name": "Alice"},
    });
    alice_tx
        .send(tungstenite::Message::Text(frame.to_string().into()))
        .await
        .unwrap();

    // then (expected result): both r1 members receive it, carol does not
    let received = next_frame(&mut bob_rx).await;
    assert_eq!(received["type"], "chat_message");
    assert_eq!(received["payload"]["message"], "hi");
    let echoed = next_frame(&mut alice_rx).await;
    assert_eq!(echoed["type"], "chat_message");
    let nothing = tokio::time::timeout(Duration::from_millis(200), carol_rx.next()).await;
    assert!(nothing.is_err(), "carol must not receive r1 chat");

    // and it is durably stored
    let history = state.chat.messages("r1", 50, 0).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].message, "hi");
}

#[tokio::test]
async fn test_disconnect_announces_participant_left() {
    // given (precondition): alice and bob connected to the same room
    let (addr, state) = spawn_server().await;
    let alice_token = issue(&state, "alice", "Alice").await;
    let bob_token = issue(&state, "bob", "Bob").await;

    let (_alice_tx, mut alice_rx) = connect(addr, "r1", &alice_token).await.unwrap();
    next_frame(&mut alice_rx).await;
    let (mut bob_tx, mut bob_rx) = connect(addr, "r1", &bob_token).await.unwrap();
    next_frame(&mut alice_rx).await;
    next_frame(&mut bob_rx).await;

    // when (operation): bob closes his connection
    bob_tx.send(tungstenite::Message::Close(None)).await.unwrap();

    // then (expected result): alice is told bob left
    let left = next_frame(&mut alice_rx).await;
    assert_eq!(left["type"], "participant_left");
    assert_eq!(left["user_id"], "bob");
}

#[tokio::test]
async fn test_rest_room_lifecycle() {
    // given (precondition): a running server and an issued token
    let (addr, state) = spawn_server().await;
    let alice_token = issue(&state, "alice", "Alice").await;
    let bob_token = issue(&state, "bob", "Bob").await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    // when/then: alice creates a room
    let room: Value = client
        .post(format!("{base}/rooms"))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let room_id = room["id"].as_str().unwrap().to_string();
    assert_eq!(room["status"], "active");

    // bob joins and shows up in the active participants
    let joined = client
        .post(format!("{base}/rooms/{room_id}/join"))
        .bearer_auth(&bob_token)
        .json(&json!({"user_name": "Bob", "avatar": ""}))
        .send()
        .await
        .unwrap();
    assert_eq!(joined.status(), 200);
    let participants: Value = client
        .get(format!("{base}/rooms/{room_id}/participants"))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(participants.as_array().unwrap().len(), 1);
    assert_eq!(participants[0]["user_id"], "bob");

    // a second join by bob is rejected as validation
    let rejoin = client
        .post(format!("{base}/rooms/{room_id}/join"))
        .bearer_auth(&bob_token)
        .json(&json!({"user_name": "Bob"}))
        .send()
        .await
        .unwrap();
    assert_eq!(rejoin.status(), 400);

    // only the creator may end the room
    let forbidden = client
        .delete(format!("{base}/rooms/{room_id}"))
        .bearer_auth(&bob_token)
        .send()
        .await
        .unwrap();
    assert_eq!(forbidden.status(), 403);
    let ended = client
        .delete(format!("{base}/rooms/{room_id}"))
        .bearer_auth(&alice_token)
        .send()
        .await
        .unwrap();
    assert_eq!(ended.status(), 204);

    // joining an ended room fails
    let too_late = client
        .post(format!("{base}/rooms/{room_id}/join"))
        .bearer_auth(&alice_token)
        .json(&json!({"user_name": "Alice"}))
        .send()
        .await
        .unwrap();
    assert_eq!(too_late.status(), 400);
    let body: Value = too_late.json().await.unwrap();
    assert_eq!(body["error"], "room has ended");
    assert_eq!(body["type"], "VALIDATION_ERROR");

    // requests without a token are unauthorized
    let anonymous = client.get(format!("{base}/rooms/{room_id}")).send().await.unwrap();
    assert_eq!(anonymous.status(), 401);
}

async fn issue(state: &Arc<AppState>, user_id: &str, name: &str) -> String {
    state
        .token_issuer
        .issue(Identity {
            user_id: user_id.into(),
            name: name.into(),
        })
        .await
}

//! Huddle signaling and chat server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000
//! ```

use std::sync::Arc;

use clap::Parser;
use huddle_server::{
    common::{Config, logger::setup_logger},
    hub::Hub,
    infrastructure::{
        HttpCallSessionProvider, InMemoryTokenVerifier,
        repository::inmemory::{InMemoryChatRepository, InMemoryRoomRepository},
    },
    ui::{AppState, Server},
    usecase::{CallUseCase, ChatUseCase, RoomUseCase},
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Signaling and chat server for ephemeral call rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();
    let config = Config::from_env();

    // 1. Repositories and capability implementations
    let room_repository = Arc::new(InMemoryRoomRepository::new());
    let chat_repository = Arc::new(InMemoryChatRepository::new());
    let token_issuer = Arc::new(InMemoryTokenVerifier::new());
    let calls_provider = Arc::new(HttpCallSessionProvider::with_base_url(
        config.calls_app_id,
        config.calls_app_secret,
        config.calls_base_url,
    ));

    // 2. UseCases
    let rooms = Arc::new(RoomUseCase::new(room_repository));
    let chat = Arc::new(ChatUseCase::new(chat_repository));
    let calls = Arc::new(CallUseCase::new(rooms.clone(), calls_provider));

    // 3. Hub: one runner task owns all registry state
    let (hub, runner) = Hub::new(chat.clone());
    tokio::spawn(runner.run());
    tracing::info!("hub runner started");

    // 4. Server
    let state = Arc::new(AppState {
        rooms,
        chat,
        calls,
        hub,
        verifier: token_issuer.clone(),
        token_issuer,
    });
    let server = Server::new(state);
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

//! Realtime presence and room-broadcast server for the hiroba chat backend.
//!
//! Tracks which users are online, propagates presence changes to their
//! friends, and fans chat/group events out to room members.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --friends friends.json
//! ```

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use clap::Parser;
use tokio::sync::Mutex;

use hiroba_server::{
    domain::{ConnectionRegistry, UserId},
    infrastructure::{InMemoryPresenceStore, RoomRouter, WebSocketConnectionSink},
    ui::Server,
    usecase::{ConnectSessionUseCase, DisconnectSessionUseCase},
};
use hiroba_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Realtime presence server with friend-scoped fan-out", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Path to a JSON file seeding the friend graph of the in-memory store:
    /// an object mapping user id to a list of friend ids
    #[arg(long)]
    friends: Option<PathBuf>,
}

/// Seed the in-memory store's friend graph from a JSON file.
async fn load_friend_graph(
    store: &InMemoryPresenceStore,
    path: &PathBuf,
) -> Result<usize, Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let graph: HashMap<String, Vec<String>> = serde_json::from_str(&raw)?;

    let mut seeded = 0;
    for (user_id, friends) in graph {
        let user_id = UserId::new(user_id)?;
        let friend_ids = friends
            .into_iter()
            .map(UserId::new)
            .collect::<Result<Vec<_>, _>>()?;
        store.set_friends(user_id, friend_ids).await;
        seeded += 1;
    }
    Ok(seeded)
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    // Initialize dependencies in order:
    // 1. Registry / Sink / Router
    // 2. PresenceStore
    // 3. UseCases
    // 4. Server

    // 1. Shared realtime state: one lock domain each
    let registry = Arc::new(Mutex::new(ConnectionRegistry::new()));
    let sink = Arc::new(WebSocketConnectionSink::new());
    let router = Arc::new(RoomRouter::new(sink.clone()));

    // 2. Create PresenceStore (in-memory database)
    let store = Arc::new(InMemoryPresenceStore::new());
    if let Some(path) = &args.friends {
        match load_friend_graph(&store, path).await {
            Ok(seeded) => {
                tracing::info!("Seeded friend graph for {} user(s) from {:?}", seeded, path);
            }
            Err(e) => {
                tracing::error!("Failed to seed friend graph from {:?}: {}", path, e);
                std::process::exit(1);
            }
        }
    } else {
        tracing::info!("No friend graph seed given, presence fan-out has no audience");
    }

    // 3. Create UseCases
    let connect_session_usecase = Arc::new(ConnectSessionUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
        sink.clone(),
    ));
    let disconnect_session_usecase = Arc::new(DisconnectSessionUseCase::new(
        registry.clone(),
        router.clone(),
        store.clone(),
        sink.clone(),
        Arc::new(SystemClock),
    ));

    // 4. Create and run the server
    let server = Server::new(
        connect_session_usecase,
        disconnect_session_usecase,
        router,
        registry,
    );
    if let Err(e) = server.run(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, ConnectionIdFactory, RoomKey, UserId},
    infrastructure::dto::websocket::ClientRequest,
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    /// User identity established by the auth collaborator. Absent or
    /// placeholder values mean the session is anonymous; the connection is
    /// still accepted for room relay.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> impl IntoResponse {
    // Convert the raw handshake value into Option<UserId> (Domain Model)
    let user_id = UserId::from_handshake(query.user_id.as_deref());
    let connection_id = ConnectionIdFactory::generate();

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id, connection_id))
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This function handles the outbound message flow: frames produced by the
/// presence coordinator and the room router (via the connection sink) are
/// written to this client's WebSocket connection.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            // Send the message to this client
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    user_id: Option<UserId>,
    connection_id: ConnectionId,
) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    // Spawn the outbound task first so connect-time events (the online
    // friends snapshot in particular) are flushed to the socket.
    let mut send_task = pusher_loop(rx, sender);

    // Run the connect protocol: registry, personal room, persistence,
    // presence fan-out, snapshot delivery. Never fails.
    state
        .connect_session_usecase
        .execute(user_id.clone(), connection_id.clone(), tx)
        .await;

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Parse the incoming request
                    let request = match serde_json::from_str::<ClientRequest>(&text) {
                        Ok(request) => request,
                        Err(e) => {
                            tracing::debug!("Ignoring unparseable client frame: {}", e);
                            continue;
                        }
                    };

                    match request {
                        ClientRequest::JoinRoom { room_id } => match RoomKey::chat(&room_id) {
                            Ok(room_key) => {
                                state_clone.router.join(&connection_id_clone, room_key).await;
                            }
                            Err(_) => {
                                tracing::debug!("Ignoring joinRoom with empty room id");
                            }
                        },
                        ClientRequest::LeaveRoom { room_id } => match RoomKey::chat(&room_id) {
                            Ok(room_key) => {
                                state_clone
                                    .router
                                    .leave(&connection_id_clone, &room_key)
                                    .await;
                            }
                            Err(_) => {
                                tracing::debug!("Ignoring leaveRoom with empty room id");
                            }
                        },
                    }
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Run the disconnect protocol: leave all rooms, detach, unregister,
    // offline fan-out if this was the user's last connection.
    state
        .disconnect_session_usecase
        .execute(user_id, connection_id.clone())
        .await;

    tracing::info!("Connection '{}' closed", connection_id);
}

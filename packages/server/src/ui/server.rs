//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::domain::ConnectionRegistry;
use crate::infrastructure::RoomRouter;
use crate::usecase::{ConnectSessionUseCase, DisconnectSessionUseCase};

use super::{
    handler::{
        http::{broadcast_to_room, broadcast_to_user, debug_presence, health_check},
        websocket::websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Realtime presence server
///
/// This struct encapsulates the composed use cases and provides methods to
/// run the server.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     connect_session_usecase,
///     disconnect_session_usecase,
///     router,
///     registry,
/// );
/// server.run("127.0.0.1".to_string(), 8080).await?;
/// ```
pub struct Server {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// Room Router（ルーム中継と外部ブロードキャストの入口）
    router: Arc<RoomRouter>,
    /// Connection Registry（デバッグエンドポイント用）
    registry: Arc<Mutex<ConnectionRegistry>>,
}

impl Server {
    /// Create a new Server instance
    pub fn new(
        connect_session_usecase: Arc<ConnectSessionUseCase>,
        disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
        router: Arc<RoomRouter>,
        registry: Arc<Mutex<ConnectionRegistry>>,
    ) -> Self {
        Self {
            connect_session_usecase,
            disconnect_session_usecase,
            router,
            registry,
        }
    }

    /// Build the axum router with all routes wired to the shared state.
    ///
    /// Exposed separately from `run` so tests can serve the application on
    /// an ephemeral port.
    pub fn into_router(self) -> Router {
        let app_state = Arc::new(AppState {
            connect_session_usecase: self.connect_session_usecase,
            disconnect_session_usecase: self.disconnect_session_usecase,
            router: self.router,
            registry: self.registry,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms/{room_id}/broadcast", post(broadcast_to_room))
            .route("/api/users/{user_id}/broadcast", post(broadcast_to_user))
            .route("/debug/presence", get(debug_presence))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state)
    }

    /// Run the realtime presence server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 8080)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address
    /// or if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Realtime presence server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

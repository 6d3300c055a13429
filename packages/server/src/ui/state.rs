//! Server state shared across handlers.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::ConnectionRegistry;
use crate::infrastructure::RoomRouter;
use crate::usecase::{ConnectSessionUseCase, DisconnectSessionUseCase};

/// Shared application state
pub struct AppState {
    /// ConnectSessionUseCase（セッション接続のユースケース）
    pub connect_session_usecase: Arc<ConnectSessionUseCase>,
    /// DisconnectSessionUseCase（セッション切断のユースケース）
    pub disconnect_session_usecase: Arc<DisconnectSessionUseCase>,
    /// Room Router: explicit joinRoom/leaveRoom requests and external
    /// broadcasts go straight here, they carry no presence side effects.
    pub router: Arc<RoomRouter>,
    /// Connection Registry, exposed for the presence debug endpoint.
    pub registry: Arc<Mutex<ConnectionRegistry>>,
}

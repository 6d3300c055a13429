//! WebSocket を使った ConnectionSink 実装
//!
//! ## 責務
//!
//! - 接続 ID ごとの WebSocket `UnboundedSender` を管理
//! - 接続へのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`src/ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `SinkChannel` を受け取り、メッセージ送信に
//! 使用します。broadcast は個々の接続への送信失敗をログに記録して
//! 続行し、呼び出し側にエラーを返しません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionSink, SinkChannel, SinkError};

/// WebSocket を使った ConnectionSink 実装
pub struct WebSocketConnectionSink {
    /// 接続中の WebSocket sender
    ///
    /// Key: ConnectionId
    /// Value: SinkChannel
    connections: Mutex<HashMap<ConnectionId, SinkChannel>>,
}

impl WebSocketConnectionSink {
    /// 新しい WebSocketConnectionSink を作成
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for WebSocketConnectionSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionSink for WebSocketConnectionSink {
    async fn attach(&self, connection_id: ConnectionId, sender: SinkChannel) {
        let mut connections = self.connections.lock().await;
        connections.insert(connection_id.clone(), sender);
        tracing::debug!("Connection '{}' attached to sink", connection_id);
    }

    async fn detach(&self, connection_id: &ConnectionId) {
        let mut connections = self.connections.lock().await;
        connections.remove(connection_id);
        tracing::debug!("Connection '{}' detached from sink", connection_id);
    }

    async fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), SinkError> {
        let connections = self.connections.lock().await;

        let Some(sender) = connections.get(connection_id) else {
            return Err(SinkError::ConnectionNotFound(
                connection_id.as_str().to_string(),
            ));
        };
        sender
            .send(content.to_string())
            .map_err(|_| SinkError::PushFailed(connection_id.as_str().to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str) {
        let connections = self.connections.lock().await;

        for target in targets {
            match connections.get(&target) {
                Some(sender) => {
                    // ブロードキャストでは一部の送信失敗を許容
                    if sender.send(content.to_string()).is_err() {
                        tracing::warn!("Failed to push message to connection '{}'", target);
                    } else {
                        tracing::debug!("Broadcasted message to connection '{}'", target);
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }
    }
}

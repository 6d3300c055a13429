//! In-process Room Router 実装
//!
//! ## 責務
//!
//! - ルームメンバーシップ（`RoomTable`）の排他制御
//! - ルームの現在のメンバー全員へのイベントファンアウト
//!
//! ## 設計ノート
//!
//! 配送は「呼び出し時点のメンバー」に対して行われる。broadcast の後に
//! join した接続には届かない（キューイングしない）。個々のメンバーへの
//! 配送失敗は ConnectionSink 側で握りつぶされ、呼び出し側には返らない。
//!
//! マルチプロセス構成で分散 pub/sub バックエンドに置き換える場合も、
//! この「現在のメンバーのみ・メンバー単位ベストエフォート」の意味論を
//! 維持すること。

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionSink, Envelope, RoomKey, RoomTable};

/// インプロセスのルームルーター
pub struct RoomRouter {
    /// ルームメンバーシップテーブル（単一ロックで排他制御）
    rooms: Mutex<RoomTable>,
    /// 配送先チャンネルの管理（トランスポート層の抽象化）
    sink: Arc<dyn ConnectionSink>,
}

impl RoomRouter {
    /// 新しい RoomRouter を作成
    pub fn new(sink: Arc<dyn ConnectionSink>) -> Self {
        Self {
            rooms: Mutex::new(RoomTable::new()),
            sink,
        }
    }

    /// 接続をルームに参加させる（冪等）
    pub async fn join(&self, connection_id: &ConnectionId, room_key: RoomKey) {
        let mut rooms = self.rooms.lock().await;
        rooms.join(connection_id.clone(), room_key.clone());
        tracing::debug!("Connection '{}' joined '{}'", connection_id, room_key);
    }

    /// 接続をルームから離脱させる（冪等）
    pub async fn leave(&self, connection_id: &ConnectionId, room_key: &RoomKey) {
        let mut rooms = self.rooms.lock().await;
        rooms.leave(connection_id, room_key);
        tracing::debug!("Connection '{}' left '{}'", connection_id, room_key);
    }

    /// 接続を所属する全ルームから離脱させる（切断時に一度だけ呼ばれる）
    pub async fn leave_all(&self, connection_id: &ConnectionId) {
        let left = {
            let mut rooms = self.rooms.lock().await;
            rooms.leave_all(connection_id)
        };
        if !left.is_empty() {
            tracing::debug!(
                "Connection '{}' left {} room(s) on disconnect",
                connection_id,
                left.len()
            );
        }
    }

    /// ルームの現在のメンバー全員にイベントを配送する
    pub async fn broadcast(&self, room_key: &RoomKey, envelope: &Envelope) {
        // メンバーのスナップショットを取ってからロックを手放す
        let targets = {
            let rooms = self.rooms.lock().await;
            rooms.members(room_key)
        };
        if targets.is_empty() {
            return;
        }

        let json = match envelope.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize '{}' event: {}", envelope.event, e);
                return;
            }
        };
        tracing::debug!(
            "Broadcasting '{}' to {} member(s) of '{}'",
            envelope.event,
            targets.len(),
            room_key
        );
        self.sink.broadcast(targets, &json).await;
    }

    /// ルームの現在のメンバー（デバッグ・テスト用）
    pub async fn members(&self, room_key: &RoomKey) -> Vec<ConnectionId> {
        let rooms = self.rooms.lock().await;
        rooms.members(room_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::sink::WebSocketConnectionSink;
    use tokio::sync::mpsc::{self, UnboundedReceiver};

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string())
    }

    fn room(id: &str) -> RoomKey {
        RoomKey::chat(id).unwrap()
    }

    async fn attach(sink: &WebSocketConnectionSink, id: &str) -> UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        sink.attach(conn(id), tx).await;
        rx
    }

    fn drain(rx: &mut UnboundedReceiver<String>) -> Vec<String> {
        let mut received = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            received.push(msg);
        }
        received
    }

    fn setup() -> (Arc<WebSocketConnectionSink>, RoomRouter) {
        let sink = Arc::new(WebSocketConnectionSink::new());
        let router = RoomRouter::new(sink.clone());
        (sink, router)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_members_only() {
        // テスト項目: broadcast はルームのメンバーだけに届く
        // given (前提条件):
        let (sink, router) = setup();
        let mut rx1 = attach(&sink, "c1").await;
        let mut rx2 = attach(&sink, "c2").await;
        router.join(&conn("c1"), room("g1")).await;

        // when (操作):
        let envelope = Envelope::new("newMessage", serde_json::json!({"text": "hi"}));
        router.broadcast(&room("g1"), &envelope).await;

        // then (期待する結果):
        let delivered = drain(&mut rx1);
        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].contains("newMessage"));
        assert!(drain(&mut rx2).is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_join_does_not_duplicate_delivery() {
        // テスト項目: 二重 join してもブロードキャストは一度だけ届く（冪等性）
        // given (前提条件):
        let (sink, router) = setup();
        let mut rx = attach(&sink, "c1").await;
        router.join(&conn("c1"), room("g1")).await;
        router.join(&conn("c1"), room("g1")).await;

        // when (操作):
        let envelope = Envelope::new("newMessage", serde_json::json!({}));
        router.broadcast(&room("g1"), &envelope).await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn test_leave_stops_delivery() {
        // テスト項目: leave した接続にはブロードキャストが届かない
        // given (前提条件):
        let (sink, router) = setup();
        let mut rx1 = attach(&sink, "c1").await;
        let mut rx2 = attach(&sink, "c2").await;
        router.join(&conn("c1"), room("g1")).await;
        router.join(&conn("c2"), room("g1")).await;

        // when (操作):
        router.leave(&conn("c1"), &room("g1")).await;
        let envelope = Envelope::new("newMessage", serde_json::json!({}));
        router.broadcast(&room("g1"), &envelope).await;

        // then (期待する結果):
        assert!(drain(&mut rx1).is_empty());
        assert_eq!(drain(&mut rx2).len(), 1);
    }

    #[tokio::test]
    async fn test_leave_all_stops_delivery_to_every_room() {
        // テスト項目: leave_all 後はどのルームのブロードキャストも届かない
        // given (前提条件):
        let (sink, router) = setup();
        let mut rx = attach(&sink, "c1").await;
        router.join(&conn("c1"), room("g1")).await;
        router.join(&conn("c1"), room("g2")).await;

        // when (操作):
        router.leave_all(&conn("c1")).await;
        let envelope = Envelope::new("newMessage", serde_json::json!({}));
        router.broadcast(&room("g1"), &envelope).await;
        router.broadcast(&room("g2"), &envelope).await;

        // then (期待する結果):
        assert!(drain(&mut rx).is_empty());
        assert!(router.members(&room("g1")).await.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_room_is_noop() {
        // テスト項目: 存在しないルームへのブロードキャストは no-op
        // given (前提条件):
        let (_sink, router) = setup();

        // when (操作) / then (期待する結果): パニックしない
        let envelope = Envelope::new("newMessage", serde_json::json!({}));
        router.broadcast(&room("empty"), &envelope).await;
    }

    #[tokio::test]
    async fn test_failed_delivery_to_one_member_does_not_abort_others() {
        // テスト項目: 1 メンバーへの配送失敗が他メンバーへの配送を妨げない
        // given (前提条件):
        let (sink, router) = setup();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        drop(dead_rx);
        sink.attach(conn("dead"), dead_tx).await;
        let mut rx = attach(&sink, "alive").await;
        router.join(&conn("dead"), room("g1")).await;
        router.join(&conn("alive"), room("g1")).await;

        // when (操作):
        let envelope = Envelope::new("newMessage", serde_json::json!({}));
        router.broadcast(&room("g1"), &envelope).await;

        // then (期待する結果):
        assert_eq!(drain(&mut rx).len(), 1);
    }
}

//! ConnectionSink trait 定義
//!
//! トランスポート層への送信インターフェース。接続 ID ごとの送信
//! チャンネルを管理し、個別送信（push_to）と複数接続への一斉送信
//! （broadcast）を提供します。
//!
//! WebSocket の生成は UI 層で行われ、この trait の実装は生成された
//! `UnboundedSender` を受け取ってメッセージ送信に使用します。
//! これにより「接続の受付」と「メッセージの送信」が分離されます。

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::id::ConnectionId;

/// 接続ごとの送信チャンネル
///
/// 受信側は接続ごとの pusher タスクが保持し、ここに送られた文字列を
/// そのまま WebSocket フレームとして書き出す。
pub type SinkChannel = mpsc::UnboundedSender<String>;

/// 個別送信の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("connection '{0}' is not attached")]
    ConnectionNotFound(String),

    #[error("failed to push to connection '{0}'")]
    PushFailed(String),
}

/// Connection Sink trait
///
/// broadcast は個々のメンバーへの配送失敗を許容する（ログに記録して
/// 続行）。失敗を呼び出し側に返さないため戻り値を持たない。
#[async_trait]
pub trait ConnectionSink: Send + Sync {
    /// 接続の送信チャンネルを登録する
    async fn attach(&self, connection_id: ConnectionId, sender: SinkChannel);

    /// 接続の送信チャンネルを破棄する
    async fn detach(&self, connection_id: &ConnectionId);

    /// 特定の接続にメッセージを送信する
    async fn push_to(&self, connection_id: &ConnectionId, content: &str) -> Result<(), SinkError>;

    /// 複数の接続にメッセージを一斉送信する（ベストエフォート）
    async fn broadcast(&self, targets: Vec<ConnectionId>, content: &str);
}

//! PresenceStore trait 定義
//!
//! ドメイン層が必要とする永続化レイヤーのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! 本番環境ではユーザードキュメントを保持するドキュメント DB が
//! このインターフェースの背後に入る想定。このコアはプレゼンス状態の
//! 書き込みと友達リストの読み出しだけを要求し、それ以外のユーザー
//! データには一切関知しない。

use async_trait::async_trait;
use thiserror::Error;

use super::id::UserId;
use super::presence::Presence;

/// 永続化レイヤーの失敗
///
/// 呼び出し側（Presence Coordinator）はこのエラーをログに記録して
/// 処理を続行する。接続のライフサイクルには伝播させない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("presence store unavailable: {0}")]
    Unavailable(String),
}

/// Presence Store trait
///
/// UseCase 層はこの trait に依存し、Infrastructure 層の具体的な実装には
/// 依存しない。異なるユーザーに対する並行呼び出しに安全であること。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceStore: Send + Sync {
    /// ユーザーのオンライン状態と lastSeen を永続化する
    async fn set_presence(&self, user_id: &UserId, presence: Presence) -> Result<(), StoreError>;

    /// ユーザーの友達 ID リストを取得する（空の場合もある）
    async fn friend_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError>;
}

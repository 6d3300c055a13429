//! InMemory Presence Store 実装
//!
//! ドメイン層が定義する PresenceStore trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! 本番ではユーザードキュメントを保持するドキュメント DB（プレゼンス
//! フィールドと友達リストを持つ users コレクション）がこの trait を
//! 実装する想定。インメモリ実装は開発用サーバーとテストのためのもので、
//! 友達グラフは起動時のシード（または `set_friends`）でしか変化しない。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Presence, PresenceStore, StoreError, UserId};

#[derive(Debug, Default)]
struct StoreInner {
    /// ユーザーごとの永続プレゼンス状態
    presence: HashMap<UserId, Presence>,
    /// 友達グラフ（対称な関係を想定。シード側が両方向を登録する）
    friends: HashMap<UserId, Vec<UserId>>,
}

/// インメモリ Presence Store 実装
pub struct InMemoryPresenceStore {
    inner: Mutex<StoreInner>,
}

impl InMemoryPresenceStore {
    /// 新しい InMemoryPresenceStore を作成
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner::default()),
        }
    }

    /// ユーザーの友達リストを登録する（シード・テスト用）
    pub async fn set_friends(&self, user_id: UserId, friends: Vec<UserId>) {
        let mut inner = self.inner.lock().await;
        inner.friends.insert(user_id, friends);
    }

    /// 永続化されたプレゼンス状態を取得する（テスト・デバッグ用）
    pub async fn presence_of(&self, user_id: &UserId) -> Option<Presence> {
        let inner = self.inner.lock().await;
        inner.presence.get(user_id).copied()
    }
}

impl Default for InMemoryPresenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceStore for InMemoryPresenceStore {
    async fn set_presence(&self, user_id: &UserId, presence: Presence) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.presence.insert(user_id.clone(), presence);
        Ok(())
    }

    async fn friend_ids(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError> {
        let inner = self.inner.lock().await;
        // 未知のユーザーは「友達なし」として扱う（エラーにしない）
        Ok(inner.friends.get(user_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Timestamp;

    fn user(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_set_presence_online() {
        // テスト項目: オンライン状態を永続化できる
        // given (前提条件):
        let store = InMemoryPresenceStore::new();

        // when (操作):
        let result = store.set_presence(&user("alice"), Presence::Online).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(store.presence_of(&user("alice")).await, Some(Presence::Online));
    }

    #[tokio::test]
    async fn test_set_presence_offline_overwrites_online() {
        // テスト項目: オフライン遷移で lastSeen 付きの状態に上書きされる
        // given (前提条件):
        let store = InMemoryPresenceStore::new();
        store
            .set_presence(&user("alice"), Presence::Online)
            .await
            .unwrap();

        // when (操作):
        let last_seen = Timestamp::new(1700000000000);
        store
            .set_presence(&user("alice"), Presence::offline_at(last_seen))
            .await
            .unwrap();

        // then (期待する結果):
        let stored = store.presence_of(&user("alice")).await.unwrap();
        assert!(!stored.is_online());
        assert_eq!(stored.last_seen(), Some(last_seen));
    }

    #[tokio::test]
    async fn test_friend_ids_returns_registered_friends() {
        // テスト項目: 登録した友達リストを取得できる
        // given (前提条件):
        let store = InMemoryPresenceStore::new();
        store
            .set_friends(user("alice"), vec![user("bob"), user("charlie")])
            .await;

        // when (操作):
        let friends = store.friend_ids(&user("alice")).await.unwrap();

        // then (期待する結果):
        assert_eq!(friends, vec![user("bob"), user("charlie")]);
    }

    #[tokio::test]
    async fn test_friend_ids_for_unknown_user_is_empty() {
        // テスト項目: 未知のユーザーの友達リストは空（エラーにならない）
        // given (前提条件):
        let store = InMemoryPresenceStore::new();

        // when (操作):
        let friends = store.friend_ids(&user("stranger")).await.unwrap();

        // then (期待する結果):
        assert!(friends.is_empty());
    }
}

//! UseCase: セッション切断処理
//!
//! 切断時は必ず全ルームから離脱し、送信チャンネルを破棄してから
//! レジストリを更新する。最後の接続が消えたときだけオフライン状態を
//! 永続化し、友達にオフライン通知をファンアウトする。他の接続が
//! 残っている間はプレゼンスイベントを一切発生させない。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectSessionUseCase::execute() メソッド
//! - マルチタブ接続で最後の 1 本が切れたときだけ通知されること
//! - lastSeen が遷移時刻として永続化・配送されること
//!
//! ### なぜこのテストが必要か
//! - 「タブを 1 つ閉じただけでオフライン表示になる」リグレッションを防ぐ
//! - 切断経路での失敗が切断処理自体を妨げないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：最後の接続の切断と通知
//! - エッジケース：複数接続のうち 1 本だけの切断、匿名接続の切断
//! - 異常系：未登録ペアの切断（no-op）、ストア障害

use std::sync::Arc;

use hiroba_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, ConnectionSink, Envelope, Presence, PresenceStore, RoomKey,
    Timestamp, Unregistration, UserId,
};
use crate::infrastructure::RoomRouter;

/// セッション切断のユースケース
pub struct DisconnectSessionUseCase {
    /// Connection Registry（単一ロックで排他制御）
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// Room Router（ファンアウトの抽象化）
    router: Arc<RoomRouter>,
    /// PresenceStore（永続化レイヤーの抽象化）
    store: Arc<dyn PresenceStore>,
    /// ConnectionSink（接続単位の配送の抽象化）
    sink: Arc<dyn ConnectionSink>,
    /// Clock（lastSeen の時刻源）
    clock: Arc<dyn Clock>,
}

impl DisconnectSessionUseCase {
    /// 新しい DisconnectSessionUseCase を作成
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        router: Arc<RoomRouter>,
        store: Arc<dyn PresenceStore>,
        sink: Arc<dyn ConnectionSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            router,
            store,
            sink,
            clock,
        }
    }

    /// セッション切断を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - 接続時に提示されたユーザー ID（匿名なら None）
    /// * `connection_id` - 切断された接続の ID（Domain Model）
    ///
    /// トランスポート層から切断理由を問わず exactly once 呼ばれる。
    pub async fn execute(&self, user_id: Option<UserId>, connection_id: ConnectionId) {
        // 1. 全ルームから離脱（メンバーシップのリークを防ぐ）
        self.router.leave_all(&connection_id).await;

        // 2. 送信チャンネルを破棄
        self.sink.detach(&connection_id).await;

        let Some(user_id) = user_id else {
            tracing::debug!("Anonymous connection '{}' disconnected", connection_id);
            return;
        };

        // 3. レジストリから解除（ロックは解除の間だけ保持する）
        let unregistration = {
            let mut registry = self.registry.lock().await;
            registry.unregister(&user_id, &connection_id)
        };

        match unregistration {
            Unregistration::StillOnline => {
                // 他の接続が残っている間はプレゼンスイベントを出さない
                tracing::debug!(
                    "User '{}' still online after '{}' disconnected",
                    user_id,
                    connection_id
                );
            }
            Unregistration::NotRegistered => {
                tracing::debug!(
                    "Unregister for unknown pair ('{}', '{}'), ignoring",
                    user_id,
                    connection_id
                );
            }
            Unregistration::WentOffline => {
                self.announce_offline(&user_id).await;
                tracing::info!("User '{}' went offline", user_id);
            }
        }
    }

    /// オフライン遷移を永続化し、友達にファンアウトする
    async fn announce_offline(&self, user_id: &UserId) {
        let last_seen = Timestamp::new(self.clock.now_utc_millis());

        // 永続化の失敗は切断処理を妨げない
        if let Err(e) = self
            .store
            .set_presence(user_id, Presence::offline_at(last_seen))
            .await
        {
            tracing::warn!("Failed to persist offline status for '{}': {}", user_id, e);
        }

        let friends = match self.store.friend_ids(user_id).await {
            Ok(friends) => friends,
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch friends of '{}', skipping offline fan-out: {}",
                    user_id,
                    e
                );
                return;
            }
        };

        let envelope = Envelope::presence_offline(user_id, last_seen);
        for friend_id in &friends {
            self.router
                .broadcast(&RoomKey::personal(friend_id), &envelope)
                .await;
        }
    }
}

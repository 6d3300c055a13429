//! UseCase: セッション接続処理
//!
//! 接続が確立しユーザー ID が提示されたときのプレゼンスプロトコル全体を
//! 司る。レジストリ登録 → パーソナルルーム参加 → （初回接続なら）
//! オンライン状態の永続化 → 友達へのファンアウト → 接続者本人への
//! オンライン友達スナップショット配送、の順で実行する。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectSessionUseCase::execute() メソッド
//! - 友達のパーソナルチャンネルだけに presence:update が届くこと
//! - 接続者本人だけにスナップショットが届くこと
//!
//! ### なぜこのテストが必要か
//! - プレゼンス通知が友達以外に漏れないこと（プライバシー）を保証
//! - 永続化・友達取得の失敗が接続を壊さないことを保証
//! - 匿名接続がレジストリとプレゼンスに一切影響しないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：友達がオンライン / オフラインの混在
//! - 異常系：ストア障害（永続化失敗、友達リスト取得失敗）
//! - エッジケース：匿名接続、同一ユーザーの 2 本目の接続

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, ConnectionSink, Envelope, Presence, PresenceStore,
    Registration, RoomKey, SinkChannel, UserId,
};
use crate::infrastructure::RoomRouter;

/// セッション接続のユースケース
pub struct ConnectSessionUseCase {
    /// Connection Registry（単一ロックで排他制御）
    registry: Arc<Mutex<ConnectionRegistry>>,
    /// Room Router（ファンアウトの抽象化）
    router: Arc<RoomRouter>,
    /// PresenceStore（永続化レイヤーの抽象化）
    store: Arc<dyn PresenceStore>,
    /// ConnectionSink（接続単位の配送の抽象化）
    sink: Arc<dyn ConnectionSink>,
}

impl ConnectSessionUseCase {
    /// 新しい ConnectSessionUseCase を作成
    pub fn new(
        registry: Arc<Mutex<ConnectionRegistry>>,
        router: Arc<RoomRouter>,
        store: Arc<dyn PresenceStore>,
        sink: Arc<dyn ConnectionSink>,
    ) -> Self {
        Self {
            registry,
            router,
            store,
            sink,
        }
    }

    /// セッション接続を実行
    ///
    /// # Arguments
    ///
    /// * `user_id` - ハンドシェイクで提示されたユーザー ID（匿名なら None）
    /// * `connection_id` - この接続の ID（Domain Model）
    /// * `sender` - この接続へのメッセージ送信用チャンネル
    ///
    /// 失敗はすべてログに記録して握りつぶす。接続自体は常に成立する。
    pub async fn execute(
        &self,
        user_id: Option<UserId>,
        connection_id: ConnectionId,
        sender: SinkChannel,
    ) {
        // 1. 送信チャンネルを登録（匿名でもルーム中継は使える）
        self.sink.attach(connection_id.clone(), sender).await;

        let Some(user_id) = user_id else {
            tracing::debug!(
                "Connection '{}' is anonymous, skipping presence protocol",
                connection_id
            );
            return;
        };

        // 2. レジストリに登録（ロックは登録の間だけ保持する）
        let registration = {
            let mut registry = self.registry.lock().await;
            registry.register(user_id.clone(), connection_id.clone())
        };

        // 3. パーソナルルームに参加（初回かどうかに関わらず常に行う）
        self.router
            .join(&connection_id, RoomKey::personal(&user_id))
            .await;

        // 4. 初回接続ならオンライン状態を永続化（失敗しても接続は継続）
        if registration == Registration::FirstConnection {
            if let Err(e) = self.store.set_presence(&user_id, Presence::Online).await {
                tracing::warn!("Failed to persist online status for '{}': {}", user_id, e);
            }
        }

        // 5. 友達リストを取得。失敗したらファンアウトもスナップショットも
        //    スキップする（接続は成立したまま）
        let friends = match self.store.friend_ids(&user_id).await {
            Ok(friends) => friends,
            Err(e) => {
                tracing::warn!(
                    "Failed to fetch friends of '{}', skipping presence fan-out: {}",
                    user_id,
                    e
                );
                return;
            }
        };

        // 6. 各友達のパーソナルチャンネルにオンライン通知をファンアウト
        let envelope = Envelope::presence_online(&user_id);
        for friend_id in &friends {
            self.router
                .broadcast(&RoomKey::personal(friend_id), &envelope)
                .await;
        }

        // 7. 接続者本人にオンライン友達のスナップショットを配送
        //    （レジストリのロックを一度だけ取って友達リスト全体を判定する）
        let online_friends: Vec<UserId> = {
            let registry = self.registry.lock().await;
            friends
                .iter()
                .filter(|friend_id| registry.is_online(friend_id))
                .cloned()
                .collect()
        };
        match Envelope::online_friends(&online_friends).to_json() {
            Ok(json) => {
                if let Err(e) = self.sink.push_to(&connection_id, &json).await {
                    tracing::warn!(
                        "Failed to deliver online friends snapshot to '{}': {}",
                        connection_id,
                        e
                    );
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize online friends snapshot: {}", e);
            }
        }

        tracing::info!("User '{}' connected via '{}'", user_id, connection_id);
    }
}

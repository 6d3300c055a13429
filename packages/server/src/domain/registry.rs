//! Connection Registry (Domain Model)
//!
//! ユーザー ID と現在生きている接続 ID 集合の対応を管理する。
//! マルチタブ・マルチデバイス接続を許容するため、1 ユーザーに複数の
//! 接続 ID が紐づく。
//!
//! ## 不変条件
//!
//! - エントリが存在する ⇔ 接続集合が空でない。
//!   集合が空になった時点でエントリごと削除され、この遷移が
//!   「ユーザーがオフラインになった」というシグナルになる。
//!
//! このモデル自体は純粋な同期構造であり、共有する際は単一の
//! `tokio::sync::Mutex` で包んで排他制御する（構成は bin 側で行う）。

use std::collections::{HashMap, HashSet, hash_map::Entry};

use super::id::{ConnectionId, UserId};

/// Outcome of registering a connection for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The user had no live connection before this one: the user just
    /// became online.
    FirstConnection,
    /// The user was already online through at least one other connection.
    AdditionalConnection,
}

/// Outcome of unregistering a connection for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unregistration {
    /// The last live connection is gone: the user just became offline.
    WentOffline,
    /// Other connections remain, the user is still online.
    StillOnline,
    /// The user/connection pair was never registered. Not an error.
    NotRegistered,
}

/// 接続レジストリ
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    users: HashMap<UserId, HashSet<ConnectionId>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a connection to the user's set, creating the set if absent.
    ///
    /// Set semantics: registering the same connection id twice leaves the
    /// registry unchanged and reports `AdditionalConnection`.
    pub fn register(&mut self, user_id: UserId, connection_id: ConnectionId) -> Registration {
        match self.users.entry(user_id) {
            Entry::Vacant(entry) => {
                entry.insert(HashSet::from([connection_id]));
                Registration::FirstConnection
            }
            Entry::Occupied(mut entry) => {
                entry.get_mut().insert(connection_id);
                Registration::AdditionalConnection
            }
        }
    }

    /// Remove a connection from the user's set. Removing the last one
    /// drops the entry entirely and reports `WentOffline`.
    pub fn unregister(
        &mut self,
        user_id: &UserId,
        connection_id: &ConnectionId,
    ) -> Unregistration {
        let Some(connections) = self.users.get_mut(user_id) else {
            return Unregistration::NotRegistered;
        };
        if !connections.remove(connection_id) {
            return Unregistration::NotRegistered;
        }
        if connections.is_empty() {
            self.users.remove(user_id);
            Unregistration::WentOffline
        } else {
            Unregistration::StillOnline
        }
    }

    /// True iff the user has at least one live connection.
    pub fn is_online(&self, user_id: &UserId) -> bool {
        self.users.contains_key(user_id)
    }

    /// One arbitrary live connection id for the user, if any.
    ///
    /// Legacy single-socket targeting. No ordering guarantee.
    pub fn any_connection_for(&self, user_id: &UserId) -> Option<ConnectionId> {
        self.users
            .get(user_id)
            .and_then(|connections| connections.iter().next().cloned())
    }

    /// Number of live connections for the user (0 if unknown).
    pub fn connection_count(&self, user_id: &UserId) -> usize {
        self.users.get(user_id).map_or(0, HashSet::len)
    }

    /// Snapshot of all currently online users with their connection counts,
    /// sorted by user id for consistent ordering. Debug surface.
    pub fn online_users(&self) -> Vec<(UserId, usize)> {
        let mut users: Vec<(UserId, usize)> = self
            .users
            .iter()
            .map(|(user_id, connections)| (user_id.clone(), connections.len()))
            .collect();
        users.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        users
    }
}

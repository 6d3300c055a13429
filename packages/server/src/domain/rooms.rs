//! Room membership table (Domain Model)
//!
//! ルームキーと所属接続集合の対応を管理する純粋モデル。逆引き
//! （接続 → 所属ルーム集合）も持ち、切断時の `leave_all` を
//! 全ルーム走査なしで処理する。
//!
//! ルームは最初の join で暗黙に生まれ、空になった時点でエントリごと
//! 削除される（次の join で再生成される）。明示的な作成・削除 API はない。

use std::collections::{HashMap, HashSet};

use super::id::ConnectionId;
use super::room_key::RoomKey;

/// ルームメンバーシップテーブル
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: HashMap<RoomKey, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<RoomKey>>,
}

impl RoomTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the connection to the room's member set. Idempotent.
    pub fn join(&mut self, connection_id: ConnectionId, room_key: RoomKey) {
        self.rooms
            .entry(room_key.clone())
            .or_default()
            .insert(connection_id.clone());
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(room_key);
    }

    /// Remove the connection from the room. Idempotent; dropping the last
    /// member removes the room entry entirely.
    pub fn leave(&mut self, connection_id: &ConnectionId, room_key: &RoomKey) {
        if let Some(members) = self.rooms.get_mut(room_key) {
            members.remove(connection_id);
            if members.is_empty() {
                self.rooms.remove(room_key);
            }
        }
        if let Some(rooms) = self.memberships.get_mut(connection_id) {
            rooms.remove(room_key);
            if rooms.is_empty() {
                self.memberships.remove(connection_id);
            }
        }
    }

    /// Remove the connection from every room it belongs to. Called once at
    /// disconnect so no membership leaks past the connection's lifetime.
    /// Returns the keys of the rooms that were left.
    pub fn leave_all(&mut self, connection_id: &ConnectionId) -> Vec<RoomKey> {
        let Some(rooms) = self.memberships.remove(connection_id) else {
            return Vec::new();
        };
        let mut left = Vec::with_capacity(rooms.len());
        for room_key in rooms {
            if let Some(members) = self.rooms.get_mut(&room_key) {
                members.remove(connection_id);
                if members.is_empty() {
                    self.rooms.remove(&room_key);
                }
            }
            left.push(room_key);
        }
        left
    }

    /// Current member set of the room at the time of the call.
    pub fn members(&self, room_key: &RoomKey) -> Vec<ConnectionId> {
        self.rooms
            .get(room_key)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Rooms the connection currently belongs to.
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomKey> {
        self.memberships
            .get(connection_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of live (non-empty) rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string())
    }

    fn room(id: &str) -> RoomKey {
        RoomKey::chat(id).unwrap()
    }

    #[test]
    fn test_join_creates_room_implicitly() {
        // テスト項目: 最初の join でルームが暗黙に生成される
        // given (前提条件):
        let mut table = RoomTable::new();
        assert_eq!(table.room_count(), 0);

        // when (操作):
        table.join(conn("c1"), room("g1"));

        // then (期待する結果):
        assert_eq!(table.room_count(), 1);
        assert_eq!(table.members(&room("g1")), vec![conn("c1")]);
    }

    #[test]
    fn test_join_is_idempotent() {
        // テスト項目: 同じ (接続, ルーム) の二重 join でメンバーシップが変化しない
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(conn("c1"), room("g1"));

        // when (操作):
        table.join(conn("c1"), room("g1"));

        // then (期待する結果):
        assert_eq!(table.members(&room("g1")).len(), 1);
        assert_eq!(table.rooms_of(&conn("c1")).len(), 1);
    }

    #[test]
    fn test_leave_drops_empty_room() {
        // テスト項目: 最後のメンバーが leave するとルームエントリが削除される
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(conn("c1"), room("g1"));
        table.join(conn("c2"), room("g1"));

        // when (操作):
        table.leave(&conn("c1"), &room("g1"));
        assert_eq!(table.room_count(), 1);
        table.leave(&conn("c2"), &room("g1"));

        // then (期待する結果):
        assert_eq!(table.room_count(), 0);
        assert!(table.members(&room("g1")).is_empty());
    }

    #[test]
    fn test_leave_is_idempotent() {
        // テスト項目: 所属していないルームからの leave は no-op
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(conn("c1"), room("g1"));

        // when (操作):
        table.leave(&conn("c2"), &room("g1"));
        table.leave(&conn("c1"), &room("g2"));

        // then (期待する結果):
        assert_eq!(table.members(&room("g1")), vec![conn("c1")]);
    }

    #[test]
    fn test_leave_all_removes_every_membership() {
        // テスト項目: leave_all で接続が所属する全ルームから削除される
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(conn("c1"), room("g1"));
        table.join(conn("c1"), room("g2"));
        table.join(conn("c2"), room("g1"));

        // when (操作):
        let mut left = table.leave_all(&conn("c1"));
        left.sort_by(|a, b| a.as_str().cmp(b.as_str()));

        // then (期待する結果):
        assert_eq!(left, vec![room("g1"), room("g2")]);
        assert_eq!(table.members(&room("g1")), vec![conn("c2")]);
        assert!(table.members(&room("g2")).is_empty());
        assert!(table.rooms_of(&conn("c1")).is_empty());
        // g2 は空になったので削除されている
        assert_eq!(table.room_count(), 1);
    }

    #[test]
    fn test_leave_all_for_unknown_connection_is_noop() {
        // テスト項目: ルームに所属していない接続の leave_all は no-op
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(conn("c1"), room("g1"));

        // when (操作):
        let left = table.leave_all(&conn("c9"));

        // then (期待する結果):
        assert!(left.is_empty());
        assert_eq!(table.members(&room("g1")), vec![conn("c1")]);
    }

    #[test]
    fn test_room_is_recreated_after_becoming_empty() {
        // テスト項目: 空になったルームは次の join で再生成される
        // given (前提条件):
        let mut table = RoomTable::new();
        table.join(conn("c1"), room("g1"));
        table.leave_all(&conn("c1"));
        assert_eq!(table.room_count(), 0);

        // when (操作):
        table.join(conn("c2"), room("g1"));

        // then (期待する結果):
        assert_eq!(table.members(&room("g1")), vec![conn("c2")]);
    }
}

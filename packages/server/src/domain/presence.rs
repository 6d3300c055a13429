//! Presence state of a user as persisted by the storage collaborator.

use serde::Serialize;

/// Unix timestamp in UTC milliseconds (Domain Model)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Durable online/last-seen state of a user.
///
/// The two fields of the stored record are folded into one enum so that
/// "online with a lastSeen value" is unrepresentable: lastSeen only exists
/// while the user is offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Online,
    Offline { last_seen: Timestamp },
}

impl Presence {
    pub fn offline_at(last_seen: Timestamp) -> Self {
        Self::Offline { last_seen }
    }

    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }

    pub fn last_seen(&self) -> Option<Timestamp> {
        match self {
            Self::Online => None,
            Self::Offline { last_seen } => Some(*last_seen),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_online_presence_has_no_last_seen() {
        // テスト項目: オンライン状態は lastSeen を持たない
        // given (前提条件):
        let presence = Presence::Online;

        // when (操作):
        let last_seen = presence.last_seen();

        // then (期待する結果):
        assert!(presence.is_online());
        assert_eq!(last_seen, None);
    }

    #[test]
    fn test_offline_presence_carries_transition_time() {
        // テスト項目: オフライン状態は遷移時刻を lastSeen として保持する
        // given (前提条件):
        let transition_time = Timestamp::new(1700000000000);

        // when (操作):
        let presence = Presence::offline_at(transition_time);

        // then (期待する結果):
        assert!(!presence.is_online());
        assert_eq!(presence.last_seen(), Some(transition_time));
    }
}

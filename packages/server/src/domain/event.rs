//! Outbound event model.
//!
//! Every server-to-client frame is a JSON envelope `{ "event": ..., "data": ... }`.
//! The presence protocol owns two event names; everything else is relayed
//! for external handlers with a caller-supplied name and payload.

use serde::{Deserialize, Serialize};

use super::id::UserId;
use super::presence::Timestamp;

/// Incremental presence change, delivered to each friend's personal channel.
pub const EVENT_PRESENCE_UPDATE: &str = "presence:update";

/// Snapshot of currently online friends, delivered once to the connecting
/// connection. The event name is what the browser client listens for.
pub const EVENT_ONLINE_FRIENDS: &str = "getOnlineUsers";

/// Payload of a `presence:update` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceUpdatePayload {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub online: bool,
    /// Transition time, present only on offline updates.
    #[serde(rename = "lastSeen", skip_serializing_if = "Option::is_none")]
    pub last_seen: Option<i64>,
}

/// Payload of the online-friends snapshot event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnlineFriendsPayload {
    #[serde(rename = "onlineFriendIds")]
    pub online_friend_ids: Vec<String>,
}

/// One outbound frame: event name plus JSON payload.
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub event: String,
    pub data: serde_json::Value,
}

impl Envelope {
    /// Envelope for an externally supplied room event (`newMessage`,
    /// `message:reaction`, and so on). The payload schema is the caller's.
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }

    pub fn presence_online(user_id: &UserId) -> Self {
        Self::new(
            EVENT_PRESENCE_UPDATE,
            serde_json::json!({
                "userId": user_id.as_str(),
                "online": true,
            }),
        )
    }

    pub fn presence_offline(user_id: &UserId, last_seen: Timestamp) -> Self {
        Self::new(
            EVENT_PRESENCE_UPDATE,
            serde_json::json!({
                "userId": user_id.as_str(),
                "online": false,
                "lastSeen": last_seen.value(),
            }),
        )
    }

    pub fn online_friends(online_friend_ids: &[UserId]) -> Self {
        let ids: Vec<&str> = online_friend_ids.iter().map(UserId::as_str).collect();
        Self::new(
            EVENT_ONLINE_FRIENDS,
            serde_json::json!({ "onlineFriendIds": ids }),
        )
    }

    /// Serialize the envelope to its wire form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

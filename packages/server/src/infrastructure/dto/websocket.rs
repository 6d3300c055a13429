//! Inbound WebSocket message DTOs.
//!
//! Clients speak JSON with a `type` discriminator. Only explicit room
//! membership requests exist; everything presence-related is implicit in
//! the connection lifecycle. Field names are camelCase to match the
//! browser client.

use serde::Deserialize;

/// A request frame sent by a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Join an ad-hoc chat/group channel (sent when the client opens a chat).
    #[serde(rename = "joinRoom")]
    JoinRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
    /// Leave an ad-hoc chat/group channel.
    #[serde(rename = "leaveRoom")]
    LeaveRoom {
        #[serde(rename = "roomId")]
        room_id: String,
    },
}

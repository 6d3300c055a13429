//! HTTP API request/response DTOs.

use serde::{Deserialize, Serialize};

/// Body of a broadcast request from an external handler (message, reaction,
/// group event). The payload schema belongs to the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct BroadcastRequestDto {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// One currently online user, as reported by the presence debug endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct OnlineUserDto {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub connections: usize,
}

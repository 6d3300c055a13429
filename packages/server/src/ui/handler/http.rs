//! HTTP API endpoint handlers.
//!
//! The broadcast endpoints are the seam for external collaborators (the
//! message/reaction/group handlers of the chat backend): they compute a
//! target channel and hand the event to the room router. Delivery is
//! best-effort per member, so the endpoints report success regardless of
//! member-level outcomes.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{Envelope, RoomKey, UserId},
    infrastructure::dto::http::{BroadcastRequestDto, OnlineUserDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /api/rooms/{room_id}/broadcast
///
/// Fan an external event out to every connection currently in `room:<room_id>`.
pub async fn broadcast_to_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Json(body): Json<BroadcastRequestDto>,
) -> Result<StatusCode, StatusCode> {
    if body.event.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let room_key = RoomKey::chat(&room_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let envelope = Envelope::new(body.event, body.payload);
    state.router.broadcast(&room_key, &envelope).await;

    Ok(StatusCode::OK)
}

/// POST /api/users/{user_id}/broadcast
///
/// Fan an external event out to all of a user's active connections via
/// their personal channel.
pub async fn broadcast_to_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<BroadcastRequestDto>,
) -> Result<StatusCode, StatusCode> {
    if body.event.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let user_id = UserId::new(user_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    let envelope = Envelope::new(body.event, body.payload);
    state
        .router
        .broadcast(&RoomKey::personal(&user_id), &envelope)
        .await;

    Ok(StatusCode::OK)
}

/// Debug endpoint to inspect who is currently online (for testing purposes)
pub async fn debug_presence(State(state): State<Arc<AppState>>) -> Json<Vec<OnlineUserDto>> {
    let registry = state.registry.lock().await;

    let online: Vec<OnlineUserDto> = registry
        .online_users()
        .into_iter()
        .map(|(user_id, connections)| OnlineUserDto {
            user_id: user_id.as_str().to_string(),
            connections,
        })
        .collect();

    Json(online)
}

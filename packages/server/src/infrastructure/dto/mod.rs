//! Data Transfer Objects (DTOs) for the realtime server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: inbound WebSocket client request DTOs
//! - `http`: HTTP API request/response DTOs

pub mod http;
pub mod websocket;

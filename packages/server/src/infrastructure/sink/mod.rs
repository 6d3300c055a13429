//! ConnectionSink implementations.

mod websocket;

pub use websocket::WebSocketConnectionSink;

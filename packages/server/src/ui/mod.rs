//! Realtime server implementation (axum).

mod handler;
mod server;
mod signal;
pub mod state; // UseCase 層の合成結果を handler からアクセスするため public

pub use server::Server;

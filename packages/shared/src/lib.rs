//! Shared utilities for the hiroba realtime chat backend.
//!
//! Cross-cutting concerns used by the server crate: logging setup and a
//! clock abstraction for testable timestamps.

pub mod logger;
pub mod time;

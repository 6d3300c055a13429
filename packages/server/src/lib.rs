//! Realtime presence and room-broadcast core for the hiroba chat backend.
//!
//! This crate maps authenticated users to their live WebSocket connections,
//! manages personal and ad-hoc room channels, and propagates presence
//! changes to each user's friends only.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

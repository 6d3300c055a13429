//! Domain layer for the realtime presence core.
//!
//! Value objects, pure state models (connection registry, room table),
//! outbound event model, and the traits the core expects its collaborators
//! to implement.

mod error;
mod event;
mod id;
mod presence;
mod registry;
mod room_key;
mod rooms;
mod sink;
mod store;

pub use error::DomainError;
pub use event::{
    EVENT_ONLINE_FRIENDS, EVENT_PRESENCE_UPDATE, Envelope, OnlineFriendsPayload,
    PresenceUpdatePayload,
};
pub use id::{ConnectionId, ConnectionIdFactory, UserId};
pub use presence::{Presence, Timestamp};
pub use registry::{ConnectionRegistry, Registration, Unregistration};
pub use room_key::RoomKey;
pub use rooms::RoomTable;
pub use sink::{ConnectionSink, SinkChannel, SinkError};
pub use store::{PresenceStore, StoreError};

#[cfg(test)]
pub use store::MockPresenceStore;

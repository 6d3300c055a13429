//! Room key value object.
//!
//! Two key families exist on the wire and their exact string forms are part
//! of the client contract: `personal:<userId>` for a user's implicit
//! channel, and `room:<chatOrGroupId>` for channels clients join on demand.

use std::fmt;

use super::error::DomainError;
use super::id::UserId;

const PERSONAL_PREFIX: &str = "personal:";
const ROOM_PREFIX: &str = "room:";

/// Name of a broadcast group of connections (Domain Model)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoomKey(String);

impl RoomKey {
    /// Key of a user's personal channel, targeted to reach all of that
    /// user's active connections.
    pub fn personal(user_id: &UserId) -> Self {
        Self(format!("{}{}", PERSONAL_PREFIX, user_id.as_str()))
    }

    /// Key of an ad-hoc chat or group channel.
    pub fn chat(room_id: &str) -> Result<Self, DomainError> {
        if room_id.trim().is_empty() {
            return Err(DomainError::InvalidRoomId);
        }
        Ok(Self(format!("{}{}", ROOM_PREFIX, room_id)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_personal(&self) -> bool {
        self.0.starts_with(PERSONAL_PREFIX)
    }
}

impl fmt::Display for RoomKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//! Identity value objects: user ids and connection ids.

use std::fmt;

use serde::Serialize;

use super::error::DomainError;

/// Placeholder strings a browser client may send when it has no user id.
/// The JavaScript frontend is known to send the literal text "undefined".
const PLACEHOLDER_USER_IDS: [&str; 2] = ["undefined", "null"];

/// User identifier (Domain Model)
///
/// The canonical string form of a user's identity as issued by the auth
/// collaborator. Guaranteed non-empty and not a client-side placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId, rejecting empty strings and placeholders.
    pub fn new(value: String) -> Result<Self, DomainError> {
        if value.trim().is_empty() || PLACEHOLDER_USER_IDS.contains(&value.as_str()) {
            return Err(DomainError::InvalidUserId(value));
        }
        Ok(Self(value))
    }

    /// Interpret the raw handshake value of a connecting transport session.
    ///
    /// Absent, empty, or placeholder values mean the session is anonymous.
    pub fn from_handshake(raw: Option<&str>) -> Option<Self> {
        raw.and_then(|value| Self::new(value.to_string()).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Connection identifier (Domain Model)
///
/// Opaque and unique per transport-level session. One user may own any
/// number of connections (multiple tabs or devices).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Factory for connection identifiers
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    /// Generate a fresh connection id for a newly established session.
    pub fn generate() -> ConnectionId {
        ConnectionId(uuid::Uuid::new_v4().to_string())
    }
}

//! Validation errors for domain value objects.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Empty strings and the placeholder values some clients send for
    /// "no user" are not valid identities.
    #[error("invalid user id: '{0}'")]
    InvalidUserId(String),

    /// Room ids must be non-empty to form a room key.
    #[error("room id must not be empty")]
    InvalidRoomId,
}

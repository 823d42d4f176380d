use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The caller asked for a room with a blank identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("room id must be non-empty")]
pub struct InvalidRoomId;

/// Opaque room identifier chosen by the caller.
///
/// [`RoomId::parse`] is the only constructor: it trims surrounding whitespace
/// and rejects empty input, so a blank id never reaches the wire.
#[derive(Debug, Clone, Serialize, Deserialize, Hash, Eq, PartialEq)]
pub struct RoomId(String);

impl RoomId {
    pub fn parse(raw: &str) -> Result<Self, InvalidRoomId> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InvalidRoomId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

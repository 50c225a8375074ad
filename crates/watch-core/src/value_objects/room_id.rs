//! Room ID - short opaque token that identifies a room
//!
//! Tokens are 8 alphanumeric characters (e.g., "aXk29QzD"), URL-safe and
//! case-sensitive. They carry no embedded structure; rooms are looked up by
//! exact match.

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Characters allowed in a room token
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a room token
const TOKEN_LEN: usize = 8;

/// Generate a random room token (8 alphanumeric characters)
pub fn generate_room_token() -> String {
    let mut rng = rand::thread_rng();
    (0..TOKEN_LEN)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Opaque room identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RoomId(String);

impl RoomId {
    /// Generate a fresh random room ID
    pub fn generate() -> Self {
        Self(generate_room_token())
    }

    /// Parse from string representation, validating length and charset
    pub fn parse(s: &str) -> Result<Self, RoomIdParseError> {
        if s.len() != TOKEN_LEN {
            return Err(RoomIdParseError::InvalidLength(s.len()));
        }
        if !s.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(RoomIdParseError::InvalidCharacter);
        }
        Ok(Self(s.to_string()))
    }

    /// View as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner token
    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Error when parsing a RoomId from string
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RoomIdParseError {
    #[error("room token must be {TOKEN_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("room token must be alphanumeric")]
    InvalidCharacter,
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RoomId {
    type Err = RoomIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomId::parse(s)
    }
}

impl Serialize for RoomId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RoomId::parse(&s).map_err(serde::de::Error::custom)
    }
}

//! The closed set of content types a telemetry request may declare.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Category of a telemetry request.
///
/// The wire form of every variant is its exact name (`"PlayerJoin"`, `"Chat"`, ...).
/// Anything outside this set is rejected before a handler is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentType {
    Auth,
    PlayerJoin,
    PlayerLeave,
    PlayerDeath,
    PlayerCommand,
    PlayerAdvancement,
    Chat,
    Log,
    Performance,
}

impl ContentType {
    /// Every declared content type, in declaration order.
    pub const ALL: [ContentType; 9] = [
        ContentType::Auth,
        ContentType::PlayerJoin,
        ContentType::PlayerLeave,
        ContentType::PlayerDeath,
        ContentType::PlayerCommand,
        ContentType::PlayerAdvancement,
        ContentType::Chat,
        ContentType::Log,
        ContentType::Performance,
    ];

    /// Returns the wire name of this content type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Auth => "Auth",
            ContentType::PlayerJoin => "PlayerJoin",
            ContentType::PlayerLeave => "PlayerLeave",
            ContentType::PlayerDeath => "PlayerDeath",
            ContentType::PlayerCommand => "PlayerCommand",
            ContentType::PlayerAdvancement => "PlayerAdvancement",
            ContentType::Chat => "Chat",
            ContentType::Log => "Log",
            ContentType::Performance => "Performance",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a declared content type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown content type: {0}")]
pub struct UnknownContentType(pub String);

impl FromStr for ContentType {
    type Err = UnknownContentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContentType::ALL
            .iter()
            .copied()
            .find(|content_type| content_type.as_str() == s)
            .ok_or_else(|| UnknownContentType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trips_every_declared_name() {
        for content_type in ContentType::ALL {
            let parsed: ContentType = content_type.as_str().parse().unwrap();
            assert_eq!(parsed, content_type);
        }
    }

    #[test]
    fn test_rejects_undeclared_names() {
        assert!("chat".parse::<ContentType>().is_err());
        assert!("PlayerKick".parse::<ContentType>().is_err());
        assert!("".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_serde_uses_variant_names() {
        let json = serde_json::to_string(&ContentType::PlayerAdvancement).unwrap();
        assert_eq!(json, "\"PlayerAdvancement\"");

        let back: ContentType = serde_json::from_str("\"Performance\"").unwrap();
        assert_eq!(back, ContentType::Performance);
    }
}

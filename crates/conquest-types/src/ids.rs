//! Type-safe identifier wrappers.
//!
//! Player identifiers are opaque strings handed to us by the identity
//! layer (Discord snowflakes in production, arbitrary labels in tests).
//! Wrapping them prevents accidental mixing with upgrade labels or store
//! keys at compile time.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Unique identifier for a player.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a player identifier from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the inner [`String`].
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for PlayerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_bare_string() {
        let id = PlayerId::new("12345");
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json.as_deref(), Some("\"12345\""));
    }

    #[test]
    fn display_matches_inner() {
        let id = PlayerId::from("alpha");
        assert_eq!(id.to_string(), "alpha");
        assert_eq!(id.as_str(), "alpha");
    }
}

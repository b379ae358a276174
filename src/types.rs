//! Basic type definitions for the chat backend
//!
//! Provides the `MemberId` newtype: a caller-supplied string identifier
//! used as the membership key.

use serde::{Deserialize, Serialize};

/// Unique member identifier (newtype pattern)
///
/// Wraps the caller-supplied id string for type-safe membership lookups.
/// Implements Hash and Eq for use as HashMap keys and serializes
/// transparently as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    /// Create a member id from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the id is empty (rejected at the boundary)
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MemberId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for MemberId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_id_equality() {
        let a = MemberId::from("alice");
        let b = MemberId::new("alice".to_string());
        assert_eq!(a, b);
        assert_ne!(a, MemberId::from("bob"));
    }

    #[test]
    fn test_member_id_display() {
        let id = MemberId::from("alice");
        assert_eq!(id.to_string(), "alice");
        assert_eq!(id.as_str(), "alice");
    }

    #[test]
    fn test_member_id_serializes_as_string() {
        let id = MemberId::from("alice");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");
    }

    #[test]
    fn test_member_id_empty() {
        assert!(MemberId::from("").is_empty());
        assert!(!MemberId::from("x").is_empty());
    }
}

//! Chat message definition
//!
//! `ChatMessage` is the immutable value record carried through mailboxes
//! and returned to polling clients as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::MemberId;

/// Reserved sender id for join/leave notices generated by the room itself
pub const SYSTEM_SENDER: &str = "System";

/// A single chat message
///
/// Immutable once constructed; the timestamp is taken at construction time.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Who sent the message (a member id, or [`SYSTEM_SENDER`])
    pub sender_id: MemberId,
    /// Message text
    pub content: String,
    /// UTC time the message was created
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message from a member, stamped with the current time
    pub fn new(sender_id: MemberId, content: impl Into<String>) -> Self {
        Self {
            sender_id,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a system notice (join/leave announcements)
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MemberId::from(SYSTEM_SENDER), content)
    }

    /// Check whether this message was generated by the room itself
    pub fn is_system(&self) -> bool {
        self.sender_id.as_str() == SYSTEM_SENDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_construction() {
        let msg = ChatMessage::new(MemberId::from("alice"), "hello");
        assert_eq!(msg.sender_id.as_str(), "alice");
        assert_eq!(msg.content, "hello");
        assert!(!msg.is_system());
    }

    #[test]
    fn test_system_message() {
        let msg = ChatMessage::system("User alice has joined the chat");
        assert_eq!(msg.sender_id.as_str(), SYSTEM_SENDER);
        assert!(msg.is_system());
    }

    #[test]
    fn test_message_serialize() {
        let msg = ChatMessage::new(MemberId::from("alice"), "hello");
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"sender_id\":\"alice\""));
        assert!(json.contains("\"content\":\"hello\""));
        assert!(json.contains("\"timestamp\""));
    }
}

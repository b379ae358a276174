//! Error types for the chat backend
//!
//! Defines the core error taxonomy surfaced to callers of the room
//! operations. Uses thiserror for ergonomic error definitions.

use thiserror::Error;

use crate::types::MemberId;

/// Core chat errors
///
/// All errors are local and synchronous: nothing is retried internally.
/// Note that a long-poll timeout with no messages is NOT an error, and
/// broadcast messages dropped on a full mailbox are intentionally silent.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Join attempted with an id that is already a member
    #[error("member '{0}' already exists")]
    DuplicateMember(MemberId),

    /// Send or receive against an id that is not a member
    #[error("member '{0}' not found")]
    MemberNotFound(MemberId),

    /// The room actor has shut down and accepts no further operations
    #[error("chat room is shut down")]
    RoomClosed,
}

//! Long-Poll Chat Backend Library
//!
//! A minimal real-time chat backend where clients retrieve messages by
//! long-polling, built with tokio using the Actor pattern for membership
//! state.
//!
//! # Features
//! - Join/leave with system announcements
//! - Broadcast fan-out into per-member bounded mailboxes
//! - Timeout-based batch retrieval (long-poll)
//! - Lossy delivery to full mailboxes so slow consumers never stall others
//! - Disconnection detection distinct from "no news"
//!
//! # Architecture
//! Uses the Actor pattern with `mpsc` channels:
//! - `RoomActor` is the single serialized owner of the membership table
//! - `ChatRoom` is the cloneable handle boundary code talks to
//! - Each member has a bounded `Mailbox`; retrieval never passes through
//!   the actor, and read-only lookups use a shared write-through view
//!
//! # Example
//! ```ignore
//! use std::time::Duration;
//! use chat_backend::{ChatRoom, MemberId};
//!
//! #[tokio::main]
//! async fn main() {
//!     let room = ChatRoom::new();
//!
//!     let alice = room.join(MemberId::from("alice")).await.unwrap();
//!     room.broadcast(MemberId::from("alice"), "hello".into()).await.unwrap();
//!
//!     let batch = alice.retrieve(Duration::from_secs(10)).await;
//!     for msg in batch.messages {
//!         println!("{}: {}", msg.sender_id, msg.content);
//!     }
//! }
//! ```

pub mod api;
pub mod error;
pub mod mailbox;
pub mod member;
pub mod message;
pub mod room;
pub mod types;

// Re-export main types for convenience
pub use error::ChatError;
pub use mailbox::{Batch, Mailbox, MAILBOX_CAPACITY};
pub use member::Member;
pub use message::{ChatMessage, SYSTEM_SENDER};
pub use room::{ChatRoom, RoomActor, RoomCommand};
pub use types::MemberId;

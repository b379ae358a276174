//! Member struct definition
//!
//! Represents one room member from the actor's point of view: the id, the
//! delivery half of the member's mailbox, and a shared handle to the
//! retrieval half.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::mailbox::Mailbox;
use crate::message::ChatMessage;
use crate::types::MemberId;

/// A current room member
///
/// Lives in the actor's membership table. Holds the only sender half of the
/// member's mailbox, so dropping a `Member` closes the mailbox: this is the
/// Open→Closed transition performed on leave.
#[derive(Debug)]
pub struct Member {
    /// Unique identifier for this member
    pub id: MemberId,
    /// Delivery half of the mailbox (fan-out writes here)
    sender: mpsc::Sender<ChatMessage>,
    /// Retrieval half, shared with the lookup view and polling consumers
    mailbox: Arc<Mailbox>,
}

impl Member {
    /// Create a new member with a fresh, empty mailbox
    pub fn new(id: MemberId) -> Self {
        let (sender, mailbox) = Mailbox::channel(id.clone());
        Self {
            id,
            sender,
            mailbox: Arc::new(mailbox),
        }
    }

    /// Shared handle to this member's mailbox
    pub fn mailbox(&self) -> Arc<Mailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Deliver a message without blocking
    ///
    /// Returns `false` if the mailbox is full; the message is dropped for
    /// this member and delivery to others continues.
    pub fn try_deliver(&self, msg: ChatMessage) -> bool {
        self.sender.try_send(msg).is_ok()
    }
}

//! Per-member mailbox with long-poll batch retrieval
//!
//! Each member owns one bounded mailbox. The room actor holds the sender
//! half and delivers with a non-blocking enqueue; the member (via whichever
//! poll request is currently active) drains the receiver half. Closing is
//! the channel-closed state: the actor dropping its sender half marks the
//! mailbox closed, after which buffered messages can still be drained but
//! nothing new can arrive.

use std::time::Duration;

use tokio::sync::{mpsc, Mutex};

use crate::message::ChatMessage;
use crate::types::MemberId;

/// Maximum number of undelivered messages buffered per member
///
/// Broadcasts beyond this are dropped for that member so one slow consumer
/// never stalls delivery to the others.
pub const MAILBOX_CAPACITY: usize = 100;

/// Result of one long-poll retrieval
#[derive(Debug)]
pub struct Batch {
    /// Everything drained in this poll, in enqueue order
    pub messages: Vec<ChatMessage>,
    /// `false` once the member has left and the mailbox is fully drained
    pub alive: bool,
}

/// Receiving half of a member's mailbox
///
/// Shared as `Arc<Mailbox>` between the membership lookup view and any
/// in-flight poll. The async Mutex serializes concurrent polls for the
/// same member: exactly one request at a time owns the drain.
#[derive(Debug)]
pub struct Mailbox {
    id: MemberId,
    receiver: Mutex<mpsc::Receiver<ChatMessage>>,
}

impl Mailbox {
    /// Create a mailbox for `id`, returning the delivery (sender) half and
    /// the retrieval half
    ///
    /// The sender half belongs to the room actor; dropping it closes the
    /// mailbox.
    pub fn channel(id: MemberId) -> (mpsc::Sender<ChatMessage>, Mailbox) {
        let (tx, rx) = mpsc::channel(MAILBOX_CAPACITY);
        let mailbox = Self {
            id,
            receiver: Mutex::new(rx),
        };
        (tx, mailbox)
    }

    /// The member this mailbox belongs to
    pub fn id(&self) -> &MemberId {
        &self.id
    }

    /// Long-poll retrieval: wait up to `timeout` for at least one message,
    /// then drain everything already buffered without further waiting
    ///
    /// Outcomes:
    /// - mailbox closed and empty: immediate `{[], alive: false}`
    /// - timeout with nothing buffered: `{[], alive: true}` (not an error)
    /// - at least one message: the whole buffered batch, in enqueue order
    pub async fn retrieve(&self, timeout: Duration) -> Batch {
        let mut receiver = self.receiver.lock().await;

        let first = match tokio::time::timeout(timeout, receiver.recv()).await {
            // Timeout elapsed with no message and no close: still a member
            Err(_) => {
                return Batch {
                    messages: Vec::new(),
                    alive: true,
                }
            }
            // Channel closed and fully drained: the member has left
            Ok(None) => {
                return Batch {
                    messages: Vec::new(),
                    alive: false,
                }
            }
            Ok(Some(msg)) => msg,
        };

        // Got one message; collect the rest of the buffer without blocking
        let mut messages = vec![first];
        while let Ok(msg) = receiver.try_recv() {
            messages.push(msg);
        }

        Batch {
            messages,
            alive: true,
        }
    }
}

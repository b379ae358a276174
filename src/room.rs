//! Room actor implementation
//!
//! The central actor that owns all membership state and performs broadcast
//! fan-out. Mutating operations (join, leave, broadcast) are commands sent
//! over an mpsc channel and processed strictly one at a time, so membership
//! transitions and fan-out never interleave. Read-only lookups are served
//! from a shared view the actor write-through updates after each mutation,
//! so boundary existence checks never round-trip through the loop.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::error::ChatError;
use crate::mailbox::Mailbox;
use crate::member::Member;
use crate::message::ChatMessage;
use crate::types::MemberId;

/// Buffer size for the actor's command channel
const COMMAND_BUFFER_SIZE: usize = 256;

/// Shared read-only membership view: id → mailbox
///
/// Written only by the room actor, immediately after each join/leave.
type MemberView = Arc<RwLock<HashMap<MemberId, Arc<Mailbox>>>>;

/// Commands sent from handles to the room actor
#[derive(Debug)]
pub enum RoomCommand {
    /// Add a member; replies with their mailbox handle or `DuplicateMember`
    Join {
        id: MemberId,
        reply: oneshot::Sender<Result<Arc<Mailbox>, ChatError>>,
    },
    /// Remove a member; replies with whether the id was found
    Leave {
        id: MemberId,
        reply: oneshot::Sender<bool>,
    },
    /// Fan a message out to every current member
    Broadcast { message: ChatMessage },
    /// Close all mailboxes and stop the actor
    Shutdown { reply: oneshot::Sender<()> },
}

/// The room actor
///
/// Owns the membership table and processes commands serially. Holds the
/// only write access to the shared lookup view.
pub struct RoomActor {
    /// Current members: MemberId -> Member
    members: HashMap<MemberId, Member>,
    /// Write-through lookup view shared with `ChatRoom` handles
    view: MemberView,
    /// Command receiver channel
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    /// Run the room actor event loop
    ///
    /// Processes commands until a `Shutdown` arrives or every handle is
    /// dropped, then closes all mailboxes.
    pub async fn run(mut self) {
        info!("room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join { id, reply } => {
                    let _ = reply.send(self.handle_join(id).await);
                }
                RoomCommand::Leave { id, reply } => {
                    let _ = reply.send(self.handle_leave(id).await);
                }
                RoomCommand::Broadcast { message } => {
                    self.fan_out(message);
                }
                RoomCommand::Shutdown { reply } => {
                    // Commands queued ahead of this one have already been
                    // processed; anything behind it is dropped.
                    self.close_all().await;
                    let _ = reply.send(());
                    break;
                }
            }
        }

        self.close_all().await;
        info!("room actor stopped");
    }

    /// Handle a join request
    ///
    /// The handle pre-checks the lookup view, but that check can be stale
    /// when two joins for the same id race. This re-check inside the
    /// serialized loop is the authoritative one: at most one mailbox per id
    /// ever lands in the table.
    async fn handle_join(&mut self, id: MemberId) -> Result<Arc<Mailbox>, ChatError> {
        if self.members.contains_key(&id) {
            return Err(ChatError::DuplicateMember(id));
        }

        let member = Member::new(id.clone());
        let mailbox = member.mailbox();
        self.members.insert(id.clone(), member);
        self.view.write().await.insert(id.clone(), Arc::clone(&mailbox));

        info!("member joined: {}", id);
        debug!("total members: {}", self.members.len());

        // Announce to the resulting membership, the joiner included
        self.fan_out(ChatMessage::system(format!(
            "User {} has joined the chat",
            id
        )));

        Ok(mailbox)
    }

    /// Handle a leave request
    ///
    /// Removing the `Member` drops the only sender half of its mailbox,
    /// which is the Open→Closed transition: pending polls drain whatever is
    /// buffered and then observe the closed state.
    async fn handle_leave(&mut self, id: MemberId) -> bool {
        let Some(member) = self.members.remove(&id) else {
            return false;
        };
        self.view.write().await.remove(&id);
        drop(member);

        info!("member left: {}", id);
        debug!("total members: {}", self.members.len());

        // Announce to the remaining members only
        self.fan_out(ChatMessage::system(format!("User {} has left the chat", id)));

        true
    }

    /// Deliver a message to every current member without blocking
    ///
    /// A full mailbox drops the message for that member; the sender is not
    /// told. One slow consumer never stalls delivery to the others.
    fn fan_out(&self, message: ChatMessage) {
        for member in self.members.values() {
            if !member.try_deliver(message.clone()) {
                warn!("mailbox full, dropping message for {}", member.id);
            }
        }
    }

    /// Close every mailbox and clear the lookup view
    async fn close_all(&mut self) {
        if self.members.is_empty() && self.view.read().await.is_empty() {
            return;
        }
        self.view.write().await.clear();
        let closed = self.members.len();
        self.members.clear();
        info!("closed {} mailboxes", closed);
    }
}

/// Cloneable handle to a running room actor
///
/// Construction spawns the actor task; every handler shares clones of one
/// handle. Lookups go straight to the shared view; mutations go through the
/// command channel.
#[derive(Clone)]
pub struct ChatRoom {
    sender: mpsc::Sender<RoomCommand>,
    view: MemberView,
}

impl ChatRoom {
    /// Create a room and spawn its actor on the current tokio runtime
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(COMMAND_BUFFER_SIZE);
        let view: MemberView = Arc::new(RwLock::new(HashMap::new()));

        let actor = RoomActor {
            members: HashMap::new(),
            view: Arc::clone(&view),
            receiver,
        };
        tokio::spawn(actor.run());

        Self { sender, view }
    }

    /// Add a member, returning a handle to their mailbox
    ///
    /// The cheap existence pre-check here avoids a loop round-trip for the
    /// common duplicate case; the actor re-checks before inserting.
    pub async fn join(&self, id: MemberId) -> Result<Arc<Mailbox>, ChatError> {
        if self.view.read().await.contains_key(&id) {
            return Err(ChatError::DuplicateMember(id));
        }

        let (reply, response) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join { id, reply })
            .await
            .map_err(|_| ChatError::RoomClosed)?;
        response.await.map_err(|_| ChatError::RoomClosed)?
    }

    /// Remove a member; returns whether the id was found
    ///
    /// Synchronous request/response over the actor: the caller waits on a
    /// oneshot reply slot, not on the whole loop.
    pub async fn leave(&self, id: MemberId) -> Result<bool, ChatError> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave { id, reply })
            .await
            .map_err(|_| ChatError::RoomClosed)?;
        response.await.map_err(|_| ChatError::RoomClosed)
    }

    /// Broadcast a message to every member
    ///
    /// The message is timestamped here, at submission. Delivery is
    /// fire-and-forget; members with full mailboxes miss it silently.
    pub async fn broadcast(&self, sender_id: MemberId, content: String) -> Result<(), ChatError> {
        let message = ChatMessage::new(sender_id, content);
        self.sender
            .send(RoomCommand::Broadcast { message })
            .await
            .map_err(|_| ChatError::RoomClosed)
    }

    /// Look up a member's mailbox without going through the actor
    pub async fn mailbox(&self, id: &MemberId) -> Option<Arc<Mailbox>> {
        self.view.read().await.get(id).cloned()
    }

    /// Check membership without going through the actor
    pub async fn contains(&self, id: &MemberId) -> bool {
        self.view.read().await.contains_key(id)
    }

    /// Number of current members
    pub async fn member_count(&self) -> usize {
        self.view.read().await.len()
    }

    /// Stop the actor: close every mailbox and reject further operations
    ///
    /// Commands already submitted are processed first (the command queue is
    /// FIFO), so pending broadcasts are flushed before mailboxes close.
    pub async fn shutdown(&self) {
        let (reply, response) = oneshot::channel();
        if self
            .sender
            .send(RoomCommand::Shutdown { reply })
            .await
            .is_ok()
        {
            let _ = response.await;
        }
    }
}

impl Default for ChatRoom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::mailbox::{Batch, MAILBOX_CAPACITY};
    use crate::message::SYSTEM_SENDER;

    const POLL: Duration = Duration::from_millis(500);

    fn text(batch: &Batch) -> Vec<&str> {
        batch.messages.iter().map(|m| m.content.as_str()).collect()
    }

    /// Round-trip a no-op leave through the actor so every previously
    /// submitted command has been processed.
    async fn settle(room: &ChatRoom) {
        let _ = room.leave(MemberId::from("__settle__")).await;
    }

    #[tokio::test]
    async fn test_join_announces_to_joiner() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();

        let batch = alice.retrieve(POLL).await;
        assert!(batch.alive);
        assert_eq!(text(&batch), vec!["User alice has joined the chat"]);
        assert_eq!(batch.messages[0].sender_id.as_str(), SYSTEM_SENDER);
    }

    #[tokio::test]
    async fn test_duplicate_join_rejected() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();

        let err = room.join(MemberId::from("alice")).await.unwrap_err();
        assert!(matches!(err, ChatError::DuplicateMember(_)));

        // Membership unchanged and the original mailbox untouched
        assert_eq!(room.member_count().await, 1);
        let batch = alice.retrieve(POLL).await;
        assert!(batch.alive);
        assert_eq!(batch.messages.len(), 1);
    }

    #[tokio::test]
    async fn test_leave_unknown_member_returns_false() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();
        let _ = alice.retrieve(POLL).await;

        assert!(!room.leave(MemberId::from("ghost")).await.unwrap());

        // No broadcast was triggered
        let batch = alice.retrieve(Duration::from_millis(100)).await;
        assert!(batch.alive);
        assert!(batch.messages.is_empty());
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_members_only() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();
        let bob = room.join(MemberId::from("bob")).await.unwrap();
        let _ = alice.retrieve(POLL).await;
        let _ = bob.retrieve(POLL).await;

        assert!(room.leave(MemberId::from("bob")).await.unwrap());
        settle(&room).await;

        // Alice sees the departure notice
        let batch = alice.retrieve(POLL).await;
        assert_eq!(text(&batch), vec!["User bob has left the chat"]);

        // Bob's mailbox is closed and never received it
        let batch = bob.retrieve(POLL).await;
        assert!(!batch.alive);
        assert!(batch.messages.is_empty());

        assert!(!room.contains(&MemberId::from("bob")).await);
    }

    #[tokio::test]
    async fn test_broadcast_ordering() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();
        let _ = alice.retrieve(POLL).await;

        room.join(MemberId::from("bob")).await.unwrap();
        room.broadcast(MemberId::from("bob"), "hi".to_string())
            .await
            .unwrap();
        settle(&room).await;

        let batch = alice.retrieve(POLL).await;
        assert_eq!(text(&batch), vec!["User bob has joined the chat", "hi"]);
        assert!(batch.messages[0].is_system());
        assert_eq!(batch.messages[1].sender_id.as_str(), "bob");
    }

    #[tokio::test]
    async fn test_full_mailbox_drops_new_broadcasts() {
        let room = ChatRoom::new();
        let fast = room.join(MemberId::from("fast")).await.unwrap();
        let slow = room.join(MemberId::from("slow")).await.unwrap();
        let _ = fast.retrieve(POLL).await;
        let _ = slow.retrieve(POLL).await;

        for i in 0..MAILBOX_CAPACITY {
            room.broadcast(MemberId::from("fast"), format!("m{i}"))
                .await
                .unwrap();
        }
        settle(&room).await;

        // Fast drains its full mailbox; slow stays at capacity
        let batch = fast.retrieve(POLL).await;
        assert_eq!(batch.messages.len(), MAILBOX_CAPACITY);

        // The next broadcast reaches fast but is dropped for slow,
        // with no error reported to the sender
        room.broadcast(MemberId::from("fast"), "late".to_string())
            .await
            .unwrap();
        settle(&room).await;

        let batch = slow.retrieve(POLL).await;
        assert_eq!(batch.messages.len(), MAILBOX_CAPACITY);
        assert!(!batch.messages.iter().any(|m| m.content == "late"));

        let batch = fast.retrieve(POLL).await;
        assert_eq!(text(&batch), vec!["late"]);
    }

    #[tokio::test]
    async fn test_end_to_end_flow() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();
        let bob = room.join(MemberId::from("bob")).await.unwrap();

        room.broadcast(MemberId::from("alice"), "hello".to_string())
            .await
            .unwrap();
        settle(&room).await;

        // Bob joined after alice, so his first batch starts at his own
        // join announcement
        let batch = bob.retrieve(Duration::from_secs(1)).await;
        assert!(batch.alive);
        assert_eq!(text(&batch), vec!["User bob has joined the chat", "hello"]);

        assert!(room.leave(MemberId::from("bob")).await.unwrap());
        settle(&room).await;

        // Alice never drained: she holds the full history in order
        let batch = alice.retrieve(POLL).await;
        assert_eq!(
            text(&batch),
            vec![
                "User alice has joined the chat",
                "User bob has joined the chat",
                "hello",
                "User bob has left the chat",
            ]
        );
    }

    #[tokio::test]
    async fn test_lookup_view_tracks_membership() {
        let room = ChatRoom::new();
        assert_eq!(room.member_count().await, 0);

        room.join(MemberId::from("alice")).await.unwrap();
        assert!(room.contains(&MemberId::from("alice")).await);
        assert!(room.mailbox(&MemberId::from("alice")).await.is_some());
        assert!(room.mailbox(&MemberId::from("ghost")).await.is_none());

        room.leave(MemberId::from("alice")).await.unwrap();
        assert!(!room.contains(&MemberId::from("alice")).await);
        assert_eq!(room.member_count().await, 0);
    }

    #[tokio::test]
    async fn test_shutdown_closes_everything() {
        let room = ChatRoom::new();
        let alice = room.join(MemberId::from("alice")).await.unwrap();
        let _ = alice.retrieve(POLL).await;

        room.shutdown().await;

        // New operations are rejected
        let err = room.join(MemberId::from("bob")).await.unwrap_err();
        assert!(matches!(err, ChatError::RoomClosed));
        assert!(matches!(
            room.broadcast(MemberId::from("alice"), "hi".to_string())
                .await
                .unwrap_err(),
            ChatError::RoomClosed
        ));

        // Existing mailboxes observe the closed state
        let batch = alice.retrieve(POLL).await;
        assert!(!batch.alive);
        assert_eq!(room.member_count().await, 0);
    }
}

//! Chat events fanned out by the broadcast dispatcher.

use super::chat::{Chat, ChatStatus, Message, Role};

/// A single event concerning one chat.
///
/// `Init` is sent only to a newly subscribed connection; everything else
/// is broadcast to all subscribers of the chat. Message/assignment/status
/// events originate from durable store mutations (write-then-publish);
/// typing and presence events are ephemeral and bypass the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Full snapshot for a fresh subscriber.
    Init(Chat),
    /// A message accepted by the store.
    Message(Message),
    /// Typing indicator change for one side of the chat.
    Typing { from: Role, typing: bool },
    /// Number of admin connections currently viewing the chat.
    Presence { admin_count: usize },
    /// Assignment changed; `None` means the chat was released.
    Assigned { assigned_admin: Option<String> },
    /// The chat was closed or reopened.
    Status(ChatStatus),
}

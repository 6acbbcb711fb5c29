//! Repository trait for the chat store.
//!
//! The domain layer defines the data-access interface it needs; the
//! infrastructure layer provides the implementation (dependency
//! inversion). The store is the single source of truth and the single
//! ordering authority for message history.

use async_trait::async_trait;

use super::chat::{Chat, ChatId, ChatStatus, Message, Role};
use super::error::ChatStoreError;

/// Durable record of chats and their message histories.
///
/// Implementations must serialize mutations per chat: two concurrent
/// `assign` calls for the same chat must never both succeed, and
/// concurrent `append_message` calls must produce a single total order.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Create a chat with a fresh id, status `open` and no messages.
    async fn create_chat(
        &self,
        name: Option<String>,
        email: Option<String>,
    ) -> Result<Chat, ChatStoreError>;

    /// Fetch a full chat snapshot.
    async fn get_chat(&self, id: &ChatId) -> Result<Chat, ChatStoreError>;

    /// All chats, newest first.
    async fn list_chats(&self) -> Vec<Chat>;

    /// Append a message. Fails with `NotFound` on an unknown chat,
    /// `Validation` on empty text and `Conflict` on a closed chat.
    /// Sets the unread flag for user messages, clears it for admin ones.
    async fn append_message(
        &self,
        id: &ChatId,
        from: Role,
        text: String,
        author: Option<String>,
    ) -> Result<Message, ChatStoreError>;

    /// Claim the chat for an admin (first claim wins).
    async fn assign(&self, id: &ChatId, admin: String) -> Result<Chat, ChatStoreError>;

    /// Release the current assignment.
    async fn unassign(&self, id: &ChatId) -> Result<Chat, ChatStoreError>;

    /// Close or reopen the chat.
    async fn set_status(&self, id: &ChatId, status: ChatStatus) -> Result<Chat, ChatStoreError>;

    /// Clear the unread flag.
    async fn mark_read(&self, id: &ChatId) -> Result<Chat, ChatStoreError>;

    /// Remove the chat and all its messages irrecoverably.
    async fn delete_chat(&self, id: &ChatId) -> Result<(), ChatStoreError>;
}

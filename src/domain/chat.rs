//! Chat entities and the rules that govern them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ChatStoreError;

/// Display name used when a visitor opens a chat without identifying
/// themselves.
pub const DEFAULT_REQUESTER_NAME: &str = "Anônimo";

/// Opaque unique identifier of a chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

impl ChatId {
    /// Create a `ChatId` from an externally supplied string.
    pub fn new(value: impl Into<String>) -> Result<Self, ChatStoreError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ChatStoreError::Validation("chat id is empty".to_string()));
        }
        Ok(Self(value))
    }

    /// Generate a fresh unique id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which side of a chat a connection or message represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Admin => f.write_str("admin"),
        }
    }
}

/// Lifecycle status of a chat. The only legal transitions are
/// `open → closed` and `closed → open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Open,
    Closed,
}

/// A single message inside a chat. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub from: Role,
    pub text: String,
    pub ts: DateTime<Utc>,
    /// Display name of the replying admin, so the end user sees who
    /// answered. `None` for user messages.
    pub author: Option<String>,
}

impl Message {
    /// Create a message, rejecting text that is empty after trimming.
    pub fn new(
        from: Role,
        text: impl Into<String>,
        ts: DateTime<Utc>,
        author: Option<String>,
    ) -> Result<Self, ChatStoreError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(ChatStoreError::Validation(
                "message text is empty".to_string(),
            ));
        }
        Ok(Self {
            from,
            text,
            ts,
            author,
        })
    }
}

/// One support conversation between an end user and the admin team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub id: ChatId,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<Message>,
    pub status: ChatStatus,
    pub assigned_admin: Option<String>,
    /// True when the most recent message is from the user and no admin
    /// has viewed the chat since.
    pub unread: bool,
}

impl Chat {
    /// Create a fresh chat. A missing requester name defaults to
    /// [`DEFAULT_REQUESTER_NAME`]; an explicitly supplied name that trims
    /// to empty is rejected.
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ChatStoreError> {
        let name = match name {
            None => DEFAULT_REQUESTER_NAME.to_string(),
            Some(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(ChatStoreError::Validation(
                        "requester name is empty".to_string(),
                    ));
                }
                name
            }
        };
        Ok(Self {
            id: ChatId::generate(),
            name,
            email,
            created_at,
            messages: Vec::new(),
            status: ChatStatus::Open,
            assigned_admin: None,
            unread: false,
        })
    }

    /// Append a message. The sequence is append-only; writes to a closed
    /// chat are rejected with `Conflict` (the store is the enforcement
    /// point of record, regardless of what the UI disables).
    pub fn append(&mut self, message: Message) -> Result<&Message, ChatStoreError> {
        if self.status == ChatStatus::Closed {
            return Err(ChatStoreError::Conflict(format!(
                "chat '{}' is closed",
                self.id
            )));
        }
        self.unread = message.from == Role::User;
        self.messages.push(message);
        Ok(self.messages.last().unwrap())
    }

    /// Claim the chat for an admin. First claim wins: claiming a chat
    /// already assigned to a different admin fails with `Conflict`;
    /// re-claiming by the same admin is an idempotent success.
    pub fn claim(&mut self, admin: &str) -> Result<(), ChatStoreError> {
        match self.assigned_admin.as_deref() {
            None => {
                self.assigned_admin = Some(admin.to_string());
                Ok(())
            }
            Some(current) if current == admin => Ok(()),
            Some(current) => Err(ChatStoreError::Conflict(format!(
                "chat '{}' is already assigned to '{}'",
                self.id, current
            ))),
        }
    }

    /// Release the current assignment, if any.
    pub fn release(&mut self) {
        self.assigned_admin = None;
    }

    pub fn set_status(&mut self, status: ChatStatus) {
        self.status = status;
    }

    pub fn mark_read(&mut self) {
        self.unread = false;
    }
}

//! HTTP API request and response bodies.
//!
//! These structs derive both `Serialize` and `Deserialize` because the
//! bundled terminal client speaks the same API the server exposes.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatStatus, Role};

/// Full chat snapshot as sent to clients (REST and the `init` frame).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatDto {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub created_at: String,
    pub messages: Vec<MessageDto>,
    pub status: ChatStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_admin: Option<String>,
    pub unread: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDto {
    pub from: Role,
    pub text: String,
    /// RFC 3339 instant assigned by the server.
    pub ts: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageRequest {
    pub text: String,
    pub from: Role,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostMessageResponse {
    pub message: MessageDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    pub admin: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseRequest {
    /// `true` closes the chat, `false` reopens it.
    pub close: bool,
}

/// Global "support online" indicator for the widget header.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceBody {
    pub admins_online: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

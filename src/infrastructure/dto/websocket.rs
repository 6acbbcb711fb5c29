//! Push-protocol frames.
//!
//! Frames are JSON objects tagged by a `type` field. The socket is a
//! best-effort notification channel layered on top of the authoritative
//! HTTP API: clients subscribe and signal typing over it, but messages
//! are written over HTTP and only the resulting broadcast arrives here.

use serde::{Deserialize, Serialize};

use crate::domain::{ChatStatus, Role};

use super::http::{ChatDto, MessageDto};

/// Frames a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    Subscribe {
        #[serde(rename = "chatId")]
        chat_id: String,
        role: Role,
    },
    Typing {
        #[serde(rename = "chatId")]
        chat_id: String,
        typing: bool,
        role: Role,
    },
}

/// Frames the server pushes to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    Init {
        chat: ChatDto,
    },
    Message {
        message: MessageDto,
    },
    Typing {
        from: Role,
        typing: bool,
    },
    Presence {
        #[serde(rename = "adminCount")]
        admin_count: usize,
    },
    Assigned {
        #[serde(rename = "assignedAdmin")]
        assigned_admin: Option<String>,
    },
    Status {
        status: ChatStatus,
    },
}

// Core data model for the messaging engine: client-side message/contact
// state and the wire types exchanged with the AI chat pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Sender id used for messages authored locally.
pub const SELF_ID: &str = "me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DeliveryStatus {
    Composed = 0,  // Draft, not yet committed (never stored; send is optimistic)
    Sent = 1,      // Accepted into the session, awaiting confirmation
    Delivered = 2, // Confirmed delivered
    Read = 3,      // Read by the recipient
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    Voice,
    Image,
    File,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
    /// Length in seconds; only meaningful for voice messages.
    pub voice_duration: Option<u32>,
    pub delivery_status: DeliveryStatus,
}

impl Message {
    /// Create a message with a fresh id and timestamp.
    pub fn new(
        sender_id: impl Into<String>,
        content: impl Into<String>,
        kind: MessageKind,
        voice_duration: Option<u32>,
        delivery_status: DeliveryStatus,
    ) -> Self {
        Message {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.into(),
            content: content.into(),
            timestamp: Utc::now(),
            kind,
            voice_duration: if kind == MessageKind::Voice {
                voice_duration
            } else {
                None
            },
            delivery_status,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub last_message_preview: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: u32,
    pub is_online: bool,
    pub is_typing: bool,
    pub is_pinned: bool,
    pub is_muted: bool,
}

impl Contact {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Contact {
            id: id.into(),
            name: name.into(),
            last_message_preview: None,
            last_message_at: None,
            unread_count: 0,
            is_online: false,
            is_typing: false,
            is_pinned: false,
            is_muted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkStatus {
    Online,
    Connecting,
    Offline,
}

// -----------------------------------------------------------------------------
// Wire types for the AI chat pipeline
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "ar")]
    Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of conversation history as sent over the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        ChatTurn {
            role: ChatRole::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatTurn {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatTurn>,
    #[serde(default)]
    pub language: Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

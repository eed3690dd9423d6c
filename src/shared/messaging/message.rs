//! Chat Message Data Structure
//!
//! Represents a message in a conversation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message in a conversation.
///
/// Messages are immutable once appended. `sequence` is assigned by the
/// message log at append time: strictly increasing, unique and contiguous
/// per conversation, and independent of wall-clock time. It is the single
/// source of truth for ordering; `created_at` is informational only and is
/// never used to resolve ordering ties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID
    pub id: Uuid,
    /// Conversation this message belongs to
    pub conversation_id: Uuid,
    /// User who sent the message
    pub sender_id: Uuid,
    /// Message content
    pub content: String,
    /// Per-conversation position assigned at append time
    pub sequence: i64,
    /// When the message was appended
    pub created_at: DateTime<Utc>,
}

/// Request to send a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Query parameters for fetching a delta of messages.
///
/// `since` defaults to 0 (full history) on the first poll; afterwards the
/// caller passes the highest sequence it has seen. `limit` caps the batch;
/// the caller paginates by repeating with the last returned sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeltaQuery {
    #[serde(default)]
    pub since: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response for listing messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMessagesResponse {
    pub messages: Vec<Message>,
}

//! Conversation Data Structure
//!
//! Represents a two-party conversation, optionally scoped to a
//! service-request context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::message::Message;

/// A conversation between exactly two participants.
///
/// For a given unordered participant pair plus context (including "no
/// context") at most one conversation exists; creation is an upsert keyed
/// on that tuple. Conversations are never deleted in normal operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conversation {
    /// Unique conversation ID
    pub id: Uuid,
    /// First participant (normalized: the smaller of the pair)
    pub participant_a: Uuid,
    /// Second participant (normalized: the larger of the pair)
    pub participant_b: Uuid,
    /// Optional service-request context this conversation is attached to
    pub context_id: Option<Uuid>,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Check if a user is a participant
    pub fn has_participant(&self, user_id: Uuid) -> bool {
        self.participant_a == user_id || self.participant_b == user_id
    }

    /// Get the other participant
    pub fn other_participant(&self, current_user_id: Uuid) -> Option<Uuid> {
        if self.participant_a == current_user_id {
            Some(self.participant_b)
        } else if self.participant_b == current_user_id {
            Some(self.participant_a)
        } else {
            None
        }
    }
}

/// Per-caller view of a conversation in the conversation list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The conversation itself
    pub conversation: Conversation,
    /// The participant the caller is talking to
    pub other_participant: Uuid,
    /// Last message in the conversation, if any
    pub last_message: Option<Message>,
    /// Number of messages the caller has not read yet
    pub unread_count: i64,
}

/// Request to create (or fetch) a conversation with another participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartConversationRequest {
    pub participant_id: Uuid,
    #[serde(default)]
    pub context_id: Option<Uuid>,
}

/// Response for listing conversations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListConversationsResponse {
    pub conversations: Vec<ConversationSummary>,
}

//! Local Conversation View
//!
//! Client-side ordered view of one conversation. Confirmed messages are
//! kept sorted by their server-assigned sequence; arrival order never
//! matters. A just-sent message may be staged optimistically under a
//! client-generated correlation id, but the staged copy is display-only:
//! it becomes part of the ordered view only once the server confirms it
//! with a sequence.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::shared::messaging::Message;

/// A message the user has sent that the server has not confirmed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    /// Client-generated correlation id, reconciled on the server response
    pub correlation_id: Uuid,
    pub content: String,
    pub queued_at: DateTime<Utc>,
}

/// Ordered local view of a conversation.
#[derive(Debug)]
pub struct ConversationView {
    conversation_id: Uuid,
    messages: Vec<Message>,
    pending: Vec<PendingMessage>,
}

impl ConversationView {
    pub fn new(conversation_id: Uuid) -> Self {
        Self {
            conversation_id,
            messages: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    /// Confirmed messages, ascending by sequence.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Optimistically staged sends awaiting confirmation.
    pub fn pending(&self) -> &[PendingMessage] {
        &self.pending
    }

    /// Highest confirmed sequence in the view; 0 when empty.
    pub fn last_seen_sequence(&self) -> i64 {
        self.messages.last().map(|m| m.sequence).unwrap_or(0)
    }

    /// Merge a polled delta into the view.
    ///
    /// Messages are inserted at their sequence position regardless of
    /// arrival order; a sequence already present is ignored, so replayed
    /// deltas are harmless.
    pub fn apply_delta(&mut self, delta: Vec<Message>) {
        for message in delta {
            if message.conversation_id != self.conversation_id {
                continue;
            }
            match self
                .messages
                .binary_search_by_key(&message.sequence, |m| m.sequence)
            {
                Ok(_) => {}
                Err(position) => self.messages.insert(position, message),
            }
        }
    }

    /// Stage a send optimistically; returns the correlation id to
    /// reconcile with once the server responds.
    pub fn stage_send(&mut self, content: impl Into<String>) -> Uuid {
        let correlation_id = Uuid::new_v4();
        self.pending.push(PendingMessage {
            correlation_id,
            content: content.into(),
            queued_at: Utc::now(),
        });
        correlation_id
    }

    /// Replace a staged send with the server-confirmed message.
    pub fn confirm_send(&mut self, correlation_id: Uuid, message: Message) {
        self.pending.retain(|p| p.correlation_id != correlation_id);
        self.apply_delta(vec![message]);
    }

    /// Drop a staged send whose request failed; the caller decides whether
    /// to resend.
    pub fn abandon_send(&mut self, correlation_id: Uuid) {
        self.pending.retain(|p| p.correlation_id != correlation_id);
    }
}

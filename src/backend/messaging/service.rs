//! Conversation Service
//!
//! The single entry point for the messaging subsystem. Wraps the
//! directory, the message log, and the read-state tracker with
//! authorization and composition; every call receives the already-verified
//! caller id explicitly, never from ambient state.

use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::directory::ConversationDirectory;
use super::log::MessageLog;
use super::notify::NotificationSink;
use super::read_state::ReadStateTracker;
use crate::shared::messaging::{Conversation, ConversationSummary, Message};
use crate::shared::MessagingError;

/// Orchestrates directory lookups, authorization, message append/read, and
/// unread aggregation.
pub struct ConversationService {
    directory: ConversationDirectory,
    log: MessageLog,
    read_state: ReadStateTracker,
    sink: Arc<dyn NotificationSink>,
}

impl ConversationService {
    pub fn new(pool: SqlitePool, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            directory: ConversationDirectory::new(pool.clone()),
            log: MessageLog::new(pool.clone()),
            read_state: ReadStateTracker::new(pool),
            sink,
        }
    }

    /// Start (or fetch) the conversation between the caller and another
    /// participant. Any authenticated principal may start a conversation
    /// with any other; calling twice returns the same conversation.
    pub async fn start_conversation(
        &self,
        caller_id: Uuid,
        other_participant_id: Uuid,
        context_id: Option<Uuid>,
    ) -> Result<Conversation, MessagingError> {
        self.directory
            .find_or_create(caller_id, other_participant_id, context_id)
            .await
    }

    /// Append a message to a conversation the caller belongs to.
    ///
    /// The notification sink is invoked after the append; its failures are
    /// its own and never fail the send.
    pub async fn send(
        &self,
        caller_id: Uuid,
        conversation_id: Uuid,
        content: &str,
    ) -> Result<Message, MessagingError> {
        self.authorize(caller_id, conversation_id).await?;
        let message = self.log.append(conversation_id, caller_id, content).await?;
        tracing::debug!(
            conversation_id = %conversation_id,
            sequence = message.sequence,
            "message appended"
        );
        self.sink.notify(&message);
        Ok(message)
    }

    /// Messages newer than `since_sequence`, ascending. This is the
    /// operation the polling loop calls repeatedly.
    pub async fn fetch_delta(
        &self,
        caller_id: Uuid,
        conversation_id: Uuid,
        since_sequence: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, MessagingError> {
        self.authorize(caller_id, conversation_id).await?;
        self.log
            .list_since(conversation_id, since_sequence, limit)
            .await
    }

    /// Advance the caller's read watermark.
    pub async fn mark_read(
        &self,
        caller_id: Uuid,
        conversation_id: Uuid,
        upto_sequence: i64,
    ) -> Result<(), MessagingError> {
        // Membership is checked inside the tracker
        self.read_state
            .mark_read(conversation_id, caller_id, upto_sequence)
            .await
    }

    /// The caller's conversations, most recently active first, each with
    /// its last message and the caller's unread count.
    pub async fn list_conversations_with_summary(
        &self,
        caller_id: Uuid,
    ) -> Result<Vec<ConversationSummary>, MessagingError> {
        let conversations = self.directory.list_for_participant(caller_id).await?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let Some(other_participant) = conversation.other_participant(caller_id) else {
                continue;
            };
            let last_message = self.log.last_message(conversation.id).await?;
            let unread_count = self
                .read_state
                .unread_count(conversation.id, caller_id)
                .await?;
            summaries.push(ConversationSummary {
                conversation,
                other_participant,
                last_message,
                unread_count,
            });
        }
        Ok(summaries)
    }

    /// Total unread messages for the caller across all conversations.
    pub async fn aggregate_unread(&self, caller_id: Uuid) -> Result<i64, MessagingError> {
        self.read_state
            .aggregate_unread(&self.directory, caller_id)
            .await
    }

    async fn authorize(
        &self,
        caller_id: Uuid,
        conversation_id: Uuid,
    ) -> Result<Conversation, MessagingError> {
        let conversation = self.directory.get(conversation_id).await?;
        if !conversation.has_participant(caller_id) {
            return Err(MessagingError::authorization(format!(
                "user {} is not a participant of conversation {}",
                caller_id, conversation_id
            )));
        }
        Ok(conversation)
    }
}

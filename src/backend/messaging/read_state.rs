//! Read State Tracker
//!
//! Owns the per-(conversation, participant) read watermark and derives
//! unread counts from it. A watermark only ever moves forward.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::directory::ConversationDirectory;
use crate::shared::messaging::ReadWatermark;
use crate::shared::MessagingError;

/// Tracks how far each participant has read in each conversation.
///
/// `mark_read` is an atomic max-clamp upsert: it is idempotent and
/// commutes with concurrent calls for the same participant, so no locking
/// is needed beyond the single statement.
#[derive(Debug, Clone)]
pub struct ReadStateTracker {
    pool: SqlitePool,
}

impl ReadStateTracker {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Advance the participant's watermark to `max(current, upto_sequence)`.
    ///
    /// A call with a smaller value than the stored watermark is a no-op.
    /// The value is also clamped to the conversation's last assigned
    /// sequence so the stored row never points past the log.
    pub async fn mark_read(
        &self,
        conversation_id: Uuid,
        participant_id: Uuid,
        upto_sequence: i64,
    ) -> Result<(), MessagingError> {
        let last_sequence = self.membership(conversation_id, participant_id).await?;
        let upto = upto_sequence.clamp(0, last_sequence);

        sqlx::query(
            "INSERT INTO read_watermarks (conversation_id, participant_id, last_read_sequence)
             VALUES (?, ?, ?)
             ON CONFLICT(conversation_id, participant_id)
             DO UPDATE SET last_read_sequence = MAX(last_read_sequence, excluded.last_read_sequence)",
        )
        .bind(conversation_id.to_string())
        .bind(participant_id.to_string())
        .bind(upto)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// The participant's current watermark; zero when nothing was read yet.
    pub async fn watermark(
        &self,
        conversation_id: Uuid,
        participant_id: Uuid,
    ) -> Result<ReadWatermark, MessagingError> {
        self.membership(conversation_id, participant_id).await?;

        let row = sqlx::query(
            "SELECT last_read_sequence FROM read_watermarks
             WHERE conversation_id = ? AND participant_id = ?",
        )
        .bind(conversation_id.to_string())
        .bind(participant_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let last_read_sequence = match row {
            Some(row) => row
                .try_get("last_read_sequence")
                .map_err(MessagingError::from)?,
            None => 0,
        };

        Ok(ReadWatermark {
            conversation_id,
            participant_id,
            last_read_sequence,
        })
    }

    /// Messages from the other participant above the caller's watermark.
    pub async fn unread_count(
        &self,
        conversation_id: Uuid,
        participant_id: Uuid,
    ) -> Result<i64, MessagingError> {
        self.membership(conversation_id, participant_id).await?;

        let row = sqlx::query(
            "SELECT COUNT(*) AS unread
             FROM messages
             WHERE conversation_id = ?
               AND sender_id != ?
               AND sequence > COALESCE(
                   (SELECT last_read_sequence FROM read_watermarks
                    WHERE conversation_id = ? AND participant_id = ?),
                   0)",
        )
        .bind(conversation_id.to_string())
        .bind(participant_id.to_string())
        .bind(conversation_id.to_string())
        .bind(participant_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        row.try_get("unread").map_err(MessagingError::from)
    }

    /// Sum of unread counts over every conversation the participant
    /// belongs to.
    pub async fn aggregate_unread(
        &self,
        directory: &ConversationDirectory,
        participant_id: Uuid,
    ) -> Result<i64, MessagingError> {
        let mut total = 0;
        for conversation in directory.list_for_participant(participant_id).await? {
            total += self.unread_count(conversation.id, participant_id).await?;
        }
        Ok(total)
    }

    /// Verify membership and return the conversation's last assigned
    /// sequence.
    async fn membership(
        &self,
        conversation_id: Uuid,
        participant_id: Uuid,
    ) -> Result<i64, MessagingError> {
        let row = sqlx::query(
            "SELECT participant_low, participant_high, last_sequence
             FROM conversations
             WHERE id = ?",
        )
        .bind(conversation_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            MessagingError::not_found(format!("conversation {} not found", conversation_id))
        })?;

        let low: String = row.try_get("participant_low").map_err(MessagingError::from)?;
        let high: String = row
            .try_get("participant_high")
            .map_err(MessagingError::from)?;
        let participant = participant_id.to_string();
        if participant != low && participant != high {
            return Err(MessagingError::authorization(format!(
                "user {} is not a participant of conversation {}",
                participant_id, conversation_id
            )));
        }

        row.try_get("last_sequence").map_err(MessagingError::from)
    }
}

//! Message Log
//!
//! Append-only, per-conversation ordered store of messages. The log is the
//! sole writer of `sequence` and the single source of truth for ordering;
//! timestamps are never used to resolve ordering ties.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::schema::{decode_timestamp, decode_uuid};
use crate::shared::messaging::Message;
use crate::shared::MessagingError;

/// Append-only message store.
///
/// Sequence assignment is serialized per conversation by incrementing the
/// conversation's counter row inside the append transaction: two
/// concurrent appends to the same conversation never observe the same
/// value, and a failed insert rolls the counter back so sequences stay
/// gapless.
#[derive(Debug, Clone)]
pub struct MessageLog {
    pool: SqlitePool,
}

impl MessageLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message and assign the next sequence for the conversation.
    ///
    /// Content must be non-empty after trimming. The sender's membership in
    /// the conversation is the service's concern; the log only checks that
    /// the conversation exists.
    pub async fn append(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        content: &str,
    ) -> Result<Message, MessagingError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MessagingError::validation(
                "content",
                "message content cannot be empty",
            ));
        }

        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "UPDATE conversations
             SET last_sequence = last_sequence + 1, last_message_at = ?
             WHERE id = ?
             RETURNING last_sequence",
        )
        .bind(created_at.to_rfc3339())
        .bind(conversation_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            return Err(MessagingError::not_found(format!(
                "conversation {} not found",
                conversation_id
            )));
        };
        let sequence: i64 = row.try_get("last_sequence").map_err(MessagingError::from)?;

        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO messages (id, conversation_id, sender_id, content, sequence, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(conversation_id.to_string())
        .bind(sender_id.to_string())
        .bind(content)
        .bind(sequence)
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Message {
            id,
            conversation_id,
            sender_id,
            content: content.to_string(),
            sequence,
            created_at,
        })
    }

    /// Messages with `sequence > since_sequence`, ascending, optionally
    /// capped. Callers paginate by repeating with the last returned
    /// sequence.
    pub async fn list_since(
        &self,
        conversation_id: Uuid,
        since_sequence: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, MessagingError> {
        self.ensure_exists(conversation_id).await?;

        let limit_clause = limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();
        let query = format!(
            "SELECT id, conversation_id, sender_id, content, sequence, created_at
             FROM messages
             WHERE conversation_id = ? AND sequence > ?
             ORDER BY sequence ASC
             {}",
            limit_clause
        );

        let rows = sqlx::query(&query)
            .bind(conversation_id.to_string())
            .bind(since_sequence)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_message).collect()
    }

    /// The most recent message in a conversation, if any.
    pub async fn last_message(
        &self,
        conversation_id: Uuid,
    ) -> Result<Option<Message>, MessagingError> {
        let row = sqlx::query(
            "SELECT id, conversation_id, sender_id, content, sequence, created_at
             FROM messages
             WHERE conversation_id = ?
             ORDER BY sequence DESC
             LIMIT 1",
        )
        .bind(conversation_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_message).transpose()
    }

    async fn ensure_exists(&self, conversation_id: Uuid) -> Result<(), MessagingError> {
        let row = sqlx::query("SELECT 1 FROM conversations WHERE id = ?")
            .bind(conversation_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if row.is_none() {
            return Err(MessagingError::not_found(format!(
                "conversation {} not found",
                conversation_id
            )));
        }
        Ok(())
    }
}

/// Convert a database row to a Message
fn row_to_message(row: &sqlx::sqlite::SqliteRow) -> Result<Message, MessagingError> {
    let id: String = row.try_get("id").map_err(MessagingError::from)?;
    let conversation_id: String = row.try_get("conversation_id").map_err(MessagingError::from)?;
    let sender_id: String = row.try_get("sender_id").map_err(MessagingError::from)?;
    let content: String = row.try_get("content").map_err(MessagingError::from)?;
    let sequence: i64 = row.try_get("sequence").map_err(MessagingError::from)?;
    let created_at: String = row.try_get("created_at").map_err(MessagingError::from)?;

    Ok(Message {
        id: decode_uuid(&id)?,
        conversation_id: decode_uuid(&conversation_id)?,
        sender_id: decode_uuid(&sender_id)?,
        content,
        sequence,
        created_at: decode_timestamp(&created_at)?,
    })
}

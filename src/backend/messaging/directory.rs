//! Conversation Directory
//!
//! Owns conversation identity: one conversation per unordered participant
//! pair plus optional service-request context, created idempotently.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::schema::{decode_timestamp, decode_uuid};
use crate::shared::messaging::Conversation;
use crate::shared::MessagingError;

/// Directory of conversations.
///
/// Creation is an upsert keyed on the normalized pair and context, backed
/// by a UNIQUE index: two racing `find_or_create` calls for the same pair
/// return the same conversation, never two.
#[derive(Debug, Clone)]
pub struct ConversationDirectory {
    pool: SqlitePool,
}

impl ConversationDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the conversation for a participant pair and context, creating
    /// it if absent. The pair is normalized, so argument order never
    /// matters.
    pub async fn find_or_create(
        &self,
        participant_a: Uuid,
        participant_b: Uuid,
        context_id: Option<Uuid>,
    ) -> Result<Conversation, MessagingError> {
        if participant_a == participant_b {
            return Err(MessagingError::validation(
                "participant_id",
                "cannot start a conversation with yourself",
            ));
        }

        let (low, high) = normalize_pair(participant_a, participant_b);
        let context_key = context_id.map(|id| id.to_string()).unwrap_or_default();

        // The insert is a no-op when the row already exists; the readback
        // below returns the surviving row either way.
        sqlx::query(
            "INSERT INTO conversations (id, participant_low, participant_high, context_id, created_at, last_sequence)
             VALUES (?, ?, ?, ?, ?, 0)
             ON CONFLICT(participant_low, participant_high, context_id) DO NOTHING",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(low.to_string())
        .bind(high.to_string())
        .bind(&context_key)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            "SELECT id, participant_low, participant_high, context_id, created_at
             FROM conversations
             WHERE participant_low = ? AND participant_high = ? AND context_id = ?",
        )
        .bind(low.to_string())
        .bind(high.to_string())
        .bind(&context_key)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            MessagingError::conflict("conversation upsert resolved to no row")
        })?;

        row_to_conversation(&row)
    }

    /// Fetch a conversation by id.
    pub async fn get(&self, conversation_id: Uuid) -> Result<Conversation, MessagingError> {
        let row = sqlx::query(
            "SELECT id, participant_low, participant_high, context_id, created_at
             FROM conversations
             WHERE id = ?",
        )
        .bind(conversation_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            MessagingError::not_found(format!("conversation {} not found", conversation_id))
        })?;

        row_to_conversation(&row)
    }

    /// Conversations the participant belongs to, most recently active
    /// first. Conversations without messages sort by creation time.
    pub async fn list_for_participant(
        &self,
        participant_id: Uuid,
    ) -> Result<Vec<Conversation>, MessagingError> {
        let rows = sqlx::query(
            "SELECT id, participant_low, participant_high, context_id, created_at
             FROM conversations
             WHERE participant_low = ? OR participant_high = ?
             ORDER BY COALESCE(last_message_at, created_at) DESC",
        )
        .bind(participant_id.to_string())
        .bind(participant_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_conversation).collect()
    }
}

/// Order-independent normalization of the participant pair.
fn normalize_pair(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Convert a database row to a Conversation
fn row_to_conversation(row: &sqlx::sqlite::SqliteRow) -> Result<Conversation, MessagingError> {
    let id: String = row.try_get("id").map_err(MessagingError::from)?;
    let low: String = row.try_get("participant_low").map_err(MessagingError::from)?;
    let high: String = row.try_get("participant_high").map_err(MessagingError::from)?;
    let context: String = row.try_get("context_id").map_err(MessagingError::from)?;
    let created_at: String = row.try_get("created_at").map_err(MessagingError::from)?;

    let context_id = if context.is_empty() {
        None
    } else {
        Some(decode_uuid(&context)?)
    };

    Ok(Conversation {
        id: decode_uuid(&id)?,
        participant_a: decode_uuid(&low)?,
        participant_b: decode_uuid(&high)?,
        context_id,
        created_at: decode_timestamp(&created_at)?,
    })
}

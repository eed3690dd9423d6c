//! Database Schema
//!
//! Table definitions and bootstrap for the messaging store. The schema is
//! created idempotently at startup; uuids are stored as TEXT and
//! timestamps as RFC3339 strings.

use sqlx::SqlitePool;

/// Schema statements, applied in order.
///
/// The UNIQUE index on `(participant_low, participant_high, context_id)`
/// is what makes conversation creation an upsert instead of a
/// read-then-write race: two racing creates resolve to the same row.
/// `context_id` is stored as `''` when absent so the index also covers
/// conversations without a service-request context.
///
/// `conversations.last_sequence` is the per-conversation sequence counter;
/// the message log increments it with a single-row UPDATE so two
/// concurrent appends can never observe the same value.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS conversations (
        id TEXT PRIMARY KEY,
        participant_low TEXT NOT NULL,
        participant_high TEXT NOT NULL,
        context_id TEXT NOT NULL DEFAULT '',
        created_at TEXT NOT NULL,
        last_sequence INTEGER NOT NULL DEFAULT 0,
        last_message_at TEXT
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_conversations_pair
        ON conversations (participant_low, participant_high, context_id)",
    "CREATE TABLE IF NOT EXISTS messages (
        id TEXT PRIMARY KEY,
        conversation_id TEXT NOT NULL REFERENCES conversations(id),
        sender_id TEXT NOT NULL,
        content TEXT NOT NULL,
        sequence INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_messages_conversation_sequence
        ON messages (conversation_id, sequence)",
    "CREATE TABLE IF NOT EXISTS read_watermarks (
        conversation_id TEXT NOT NULL REFERENCES conversations(id),
        participant_id TEXT NOT NULL,
        last_read_sequence INTEGER NOT NULL DEFAULT 0,
        PRIMARY KEY (conversation_id, participant_id)
    )",
];

/// Create all messaging tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Decode a TEXT uuid column.
pub(crate) fn decode_uuid(value: &str) -> Result<uuid::Uuid, crate::shared::MessagingError> {
    uuid::Uuid::parse_str(value).map_err(|e| {
        crate::shared::MessagingError::transient(format!("corrupt uuid in storage: {}", e))
    })
}

/// Decode an RFC3339 TEXT timestamp column.
pub(crate) fn decode_timestamp(
    value: &str,
) -> Result<chrono::DateTime<chrono::Utc>, crate::shared::MessagingError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            crate::shared::MessagingError::transient(format!("corrupt timestamp in storage: {}", e))
        })
}

/// In-memory pool with the schema applied, for tests.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    init_schema(&pool).await.expect("failed to create schema");
    pool
}

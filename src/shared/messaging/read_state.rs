//! Read Watermark Data Structure
//!
//! Tracks the highest message sequence each participant has acknowledged
//! as read, one watermark per (conversation, participant).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The highest sequence a participant has read in a conversation.
///
/// `last_read_sequence` is monotonically non-decreasing: marking a smaller
/// sequence as read is a no-op, never a regression. A message is unseen
/// when its sequence is above the watermark and seen otherwise; there is no
/// separate "delivered" state in a polling model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadWatermark {
    pub conversation_id: Uuid,
    pub participant_id: Uuid,
    pub last_read_sequence: i64,
}

/// Request to advance the caller's read watermark
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadRequest {
    pub upto_sequence: i64,
}

/// Response carrying an unread total
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread: i64,
}

//! New-Message Notification Sink
//!
//! The conversation service emits a notification after every durable
//! append. Delivery is fire-and-forget: a sink failure is logged and must
//! never fail the send itself.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::messaging::Message;

/// Receiver of new-message events.
///
/// Implementations must not block the send path; anything slow belongs on
/// a task of its own.
pub trait NotificationSink: Send + Sync {
    /// Called once per message, after it is durably appended.
    fn notify(&self, message: &Message);
}

/// Broadcast state for conversations.
///
/// Manages per-conversation broadcast channels for new-message delivery.
/// Each conversation gets its own channel to prevent cross-talk; senders
/// are created lazily on first use.
#[derive(Debug, Clone)]
pub struct MessageBroadcast {
    channels: Arc<Mutex<HashMap<Uuid, broadcast::Sender<Message>>>>,
}

impl MessageBroadcast {
    pub fn new() -> Self {
        Self {
            channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Subscribe to new messages in a conversation.
    pub fn subscribe(&self, conversation_id: Uuid) -> broadcast::Receiver<Message> {
        self.sender(conversation_id).subscribe()
    }

    /// Get or create the broadcast sender for a conversation.
    fn sender(&self, conversation_id: Uuid) -> broadcast::Sender<Message> {
        let mut channels = self.channels.lock().expect("broadcast channel map poisoned");
        channels
            .entry(conversation_id)
            .or_insert_with(|| broadcast::channel(100).0)
            .clone()
    }

    /// Subscriber count for a conversation (for diagnostics).
    pub fn subscriber_count(&self, conversation_id: Uuid) -> usize {
        let channels = self.channels.lock().expect("broadcast channel map poisoned");
        channels
            .get(&conversation_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    /// Drop channels that no longer have subscribers.
    pub fn cleanup_idle_channels(&self) {
        let mut channels = self.channels.lock().expect("broadcast channel map poisoned");
        channels.retain(|_, sender| sender.receiver_count() > 0);
    }
}

impl Default for MessageBroadcast {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for MessageBroadcast {
    fn notify(&self, message: &Message) {
        let sender = {
            let channels = self.channels.lock().expect("broadcast channel map poisoned");
            channels.get(&message.conversation_id).cloned()
        };
        if let Some(sender) = sender {
            // No receivers is the normal idle case, not a failure
            if sender.send(message.clone()).is_err() {
                tracing::debug!(
                    conversation_id = %message.conversation_id,
                    "no subscribers for new-message notification"
                );
            }
        }
    }
}

/// Sink that drops every event; used in tests and headless setups.
#[derive(Debug, Clone, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _message: &Message) {}
}

//! Conversation API Client
//!
//! Thin REST client over the conversation API. Every call carries the
//! bearer principal; responses are unwrapped from the uniform JSON
//! envelope and HTTP failures are mapped back onto the shared error
//! taxonomy.
//!
//! A failed send is returned to the caller as-is and is never retried
//! here: a message is either durably appended with a server-assigned
//! sequence or not appended at all, and only the caller may resend.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::shared::messaging::{
    ApiResponse, Conversation, ConversationSummary, ListConversationsResponse,
    ListMessagesResponse, MarkReadRequest, Message, SendMessageRequest,
    StartConversationRequest, UnreadCountResponse,
};
use crate::shared::MessagingError;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://127.0.0.1:3000`
    pub base_url: String,
    /// Bearer principal issued by the external identity collaborator
    pub bearer_token: String,
    /// Fixed polling period for open conversations
    pub poll_interval: Duration,
}

impl ClientConfig {
    /// Configuration with the default 4 second polling period.
    pub fn new(base_url: impl Into<String>, bearer_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bearer_token: bearer_token.into(),
            poll_interval: Duration::from_secs(4),
        }
    }

    /// Override the polling period.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Build a full API URL from a path.
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// REST client for the conversation API
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Create (or fetch) the conversation with another participant.
    pub async fn start_conversation(
        &self,
        participant_id: Uuid,
        context_id: Option<Uuid>,
    ) -> Result<Conversation, MessagingError> {
        let response = self
            .http
            .post(self.config.api_url("/api/conversations"))
            .bearer_auth(&self.config.bearer_token)
            .json(&StartConversationRequest {
                participant_id,
                context_id,
            })
            .send()
            .await?;

        unwrap_data(response).await
    }

    /// List the caller's conversations with summaries.
    pub async fn list_conversations(&self) -> Result<Vec<ConversationSummary>, MessagingError> {
        let response = self
            .http
            .get(self.config.api_url("/api/conversations"))
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await?;

        unwrap_data::<ListConversationsResponse>(response)
            .await
            .map(|body| body.conversations)
    }

    /// Total unread count across all conversations.
    pub async fn aggregate_unread(&self) -> Result<i64, MessagingError> {
        let response = self
            .http
            .get(self.config.api_url("/api/conversations/unread-count"))
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await?;

        unwrap_data::<UnreadCountResponse>(response)
            .await
            .map(|body| body.unread)
    }

    /// Send a message; resolves to the server-confirmed message with its
    /// assigned sequence.
    pub async fn send_message(
        &self,
        conversation_id: Uuid,
        content: impl Into<String>,
    ) -> Result<Message, MessagingError> {
        let response = self
            .http
            .post(
                self.config
                    .api_url(&format!("/api/conversations/{}/messages", conversation_id)),
            )
            .bearer_auth(&self.config.bearer_token)
            .json(&SendMessageRequest {
                content: content.into(),
            })
            .send()
            .await?;

        unwrap_data(response).await
    }

    /// Messages newer than `since_sequence`, ascending.
    pub async fn fetch_delta(
        &self,
        conversation_id: Uuid,
        since_sequence: i64,
        limit: Option<i64>,
    ) -> Result<Vec<Message>, MessagingError> {
        let mut url = self.config.api_url(&format!(
            "/api/conversations/{}/messages?since={}",
            conversation_id, since_sequence
        ));
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={}", limit));
        }

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.bearer_token)
            .send()
            .await?;

        unwrap_data::<ListMessagesResponse>(response)
            .await
            .map(|body| body.messages)
    }

    /// Advance the caller's read watermark.
    pub async fn mark_read(
        &self,
        conversation_id: Uuid,
        upto_sequence: i64,
    ) -> Result<(), MessagingError> {
        let response = self
            .http
            .put(
                self.config
                    .api_url(&format!("/api/conversations/{}/read", conversation_id)),
            )
            .bearer_auth(&self.config.bearer_token)
            .json(&MarkReadRequest { upto_sequence })
            .send()
            .await?;

        let status = response.status();
        let envelope: ApiResponse<serde_json::Value> = response.json().await?;
        if status.is_success() && envelope.success {
            Ok(())
        } else {
            Err(error_from(status, envelope.error))
        }
    }
}

/// Unwrap a successful envelope payload or map the failure onto the error
/// taxonomy.
async fn unwrap_data<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, MessagingError> {
    let status = response.status();
    let envelope: ApiResponse<T> = response.json().await?;
    if status.is_success() && envelope.success {
        envelope
            .data
            .ok_or_else(|| MessagingError::transient("response envelope missing data"))
    } else {
        Err(error_from(status, envelope.error))
    }
}

fn error_from(status: StatusCode, error: Option<String>) -> MessagingError {
    let message = error.unwrap_or_else(|| status.to_string());
    match status.as_u16() {
        400 | 422 => MessagingError::validation("request", message),
        401 | 403 => MessagingError::authorization(message),
        404 => MessagingError::not_found(message),
        409 => MessagingError::conflict(message),
        _ => MessagingError::transient(message),
    }
}

//! Sync Poller
//!
//! Fixed-interval delta polling for an open conversation. The poller is an
//! explicit scheduler object: `start` returns a handle holding the
//! conversation id, the sequence cursor, and the cancellation channel;
//! `stop` takes effect before the next tick and a response that arrives
//! after cancellation is discarded.
//!
//! A tick that fires while a request is still in flight is skipped, never
//! queued: there is at most one outstanding poll per conversation. A
//! failed poll is logged and the timer continues on schedule; each tick is
//! an independent attempt, so transient failures heal on the next one.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use uuid::Uuid;

use super::api::ApiClient;
use crate::shared::messaging::Message;

/// Events delivered to the conversation UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollerEvent {
    /// New messages arrived, ascending by sequence
    Delta(Vec<Message>),
    /// A poll tick failed; the next tick retries on schedule
    Failed(String),
}

/// Options for a polling session
#[derive(Debug, Clone)]
pub struct PollOptions {
    /// Sequence cursor to resume from; 0 fetches the full history first
    pub since_sequence: i64,
    /// Polling period; defaults to the client configuration
    pub interval: Option<Duration>,
    /// Whether the conversation is the one currently being viewed; when
    /// true, each delta advances the read watermark automatically
    pub active_view: bool,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            since_sequence: 0,
            interval: None,
            active_view: true,
        }
    }
}

/// Spawns polling sessions over an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct SyncPoller {
    client: Arc<ApiClient>,
}

impl SyncPoller {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Start polling a conversation. Returns a handle owning the session;
    /// the session ends when `stop` is called or the handle is dropped.
    pub fn start(&self, conversation_id: Uuid, options: PollOptions) -> PollerHandle {
        let period = options
            .interval
            .unwrap_or(self.client.config().poll_interval);
        let cursor = Arc::new(AtomicI64::new(options.since_sequence));
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let task = tokio::spawn(poll_loop(
            self.client.clone(),
            conversation_id,
            period,
            options.active_view,
            cursor.clone(),
            cancel_rx,
            event_tx,
        ));

        PollerHandle {
            conversation_id,
            cursor,
            cancel: cancel_tx,
            events: event_rx,
            task,
        }
    }
}

/// Handle to a running polling session.
///
/// Dropping the handle cancels the session: the task observes the closed
/// cancellation channel on its next wakeup and exits.
#[derive(Debug)]
pub struct PollerHandle {
    conversation_id: Uuid,
    cursor: Arc<AtomicI64>,
    cancel: watch::Sender<bool>,
    events: mpsc::UnboundedReceiver<PollerEvent>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn conversation_id(&self) -> Uuid {
        self.conversation_id
    }

    /// Highest sequence the session has seen so far.
    pub fn last_seen_sequence(&self) -> i64 {
        self.cursor.load(Ordering::Acquire)
    }

    /// Wait for the next poller event. Returns `None` once the session has
    /// ended and all buffered events were drained.
    pub async fn next_event(&mut self) -> Option<PollerEvent> {
        self.events.recv().await
    }

    /// Non-blocking event check, for immediate-mode UIs.
    pub fn try_next_event(&mut self) -> Option<PollerEvent> {
        self.events.try_recv().ok()
    }

    /// Cancel the session. Takes effect before the next tick; an in-flight
    /// request is allowed to complete but its result is discarded.
    pub fn stop(&self) {
        let _ = self.cancel.send(true);
    }

    /// Whether the polling task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn poll_loop(
    client: Arc<ApiClient>,
    conversation_id: Uuid,
    period: Duration,
    active_view: bool,
    cursor: Arc<AtomicI64>,
    mut cancel_rx: watch::Receiver<bool>,
    event_tx: mpsc::UnboundedSender<PollerEvent>,
) {
    let mut interval = tokio::time::interval(period);
    // Ticks that would have fired while a poll was in flight are skipped,
    // not queued up
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                // Cancelled, or the handle was dropped
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
            }
            _ = interval.tick() => {
                let since = cursor.load(Ordering::Acquire);
                let result = client.fetch_delta(conversation_id, since, None).await;

                // stop() may have raced the request; its result is stale
                if *cancel_rx.borrow() {
                    break;
                }

                match result {
                    Ok(delta) if delta.is_empty() => {}
                    Ok(delta) => {
                        let newest = delta
                            .iter()
                            .map(|message| message.sequence)
                            .max()
                            .unwrap_or(since);
                        cursor.store(newest, Ordering::Release);

                        if active_view {
                            if let Err(e) = client.mark_read(conversation_id, newest).await {
                                tracing::warn!(
                                    conversation_id = %conversation_id,
                                    "failed to advance read watermark: {}",
                                    e
                                );
                            }
                            if *cancel_rx.borrow() {
                                break;
                            }
                        }

                        if event_tx.send(PollerEvent::Delta(delta)).is_err() {
                            // Receiver gone: nobody is watching this session
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(
                            conversation_id = %conversation_id,
                            "poll failed (will retry on next tick): {}",
                            e
                        );
                        if event_tx.send(PollerEvent::Failed(e.to_string())).is_err() {
                            break;
                        }
                    }
                }
            }
        }
    }

    tracing::debug!(conversation_id = %conversation_id, "polling session ended");
}

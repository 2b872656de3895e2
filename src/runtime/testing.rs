//! Test harness for the conversation executor
//!
//! Runs a `ConversationRuntime` against a recording store without going
//! through the `SessionManager`.

use super::traits::*;
use super::{ConversationRuntime, Envelope, SseEvent};
use crate::state_machine::{ConvContext, ConvState, Event, Message};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Recording Store
// ============================================================================

/// Storage call, in the order the runtime made it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Append(u64),
    SetDraft(String),
    ClearDraft,
}

/// In-memory store that also records every write
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemorySession,
    calls: Mutex<Vec<StoreCall>>,
}

impl RecordingStore {
    pub fn seeded(seed: Message) -> Self {
        Self {
            inner: InMemorySession::seeded(seed),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageStore for RecordingStore {
    async fn append(&self, message: Message) {
        self.calls.lock().unwrap().push(StoreCall::Append(message.id));
        self.inner.append(message).await;
    }

    async fn messages(&self) -> Vec<Message> {
        self.inner.messages().await
    }

    async fn last_id(&self) -> u64 {
        self.inner.last_id().await
    }
}

#[async_trait]
impl DraftStore for RecordingStore {
    async fn set_draft(&self, text: String) {
        self.calls
            .lock()
            .unwrap()
            .push(StoreCall::SetDraft(text.clone()));
        self.inner.set_draft(text).await;
    }

    async fn clear_draft(&self) {
        self.calls.lock().unwrap().push(StoreCall::ClearDraft);
        self.inner.clear_draft().await;
    }

    async fn draft(&self) -> String {
        self.inner.draft().await
    }
}

// ============================================================================
// Test Runtime
// ============================================================================

pub struct TestRuntimeBuilder {
    reply_delay: Duration,
    reply_text: Option<String>,
}

impl TestRuntimeBuilder {
    pub fn reply_delay(mut self, delay: Duration) -> Self {
        self.reply_delay = delay;
        self
    }

    pub fn reply_text(mut self, text: impl Into<String>) -> Self {
        self.reply_text = Some(text.into());
        self
    }

    pub fn build(self) -> TestRuntime {
        let mut context = ConvContext::new("test-session", self.reply_delay);
        if let Some(reply) = self.reply_text {
            context = context.with_script("hi there", reply);
        }

        let store = Arc::new(RecordingStore::seeded(context.greeting_message(Utc::now())));
        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, broadcast_rx) = broadcast::channel(128);
        let (state_tx, state_rx) = watch::channel(ConvState::AwaitingInput);
        let cancel = CancellationToken::new();

        let runtime = ConversationRuntime::new(
            context,
            store.clone(),
            event_rx,
            event_tx.clone(),
            broadcast_tx,
            state_tx,
            cancel.clone(),
        );
        let task = tokio::spawn(runtime.run());

        TestRuntime {
            store,
            event_tx,
            broadcast_rx,
            state_rx,
            cancel,
            task,
        }
    }
}

pub struct TestRuntime {
    pub store: Arc<RecordingStore>,
    event_tx: mpsc::Sender<Envelope>,
    pub broadcast_rx: broadcast::Receiver<SseEvent>,
    state_rx: watch::Receiver<ConvState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TestRuntime {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> TestRuntimeBuilder {
        TestRuntimeBuilder {
            reply_delay: Duration::from_millis(1000),
            reply_text: None,
        }
    }

    /// Send an event and wait for the runtime to apply it
    pub async fn send(&self, event: Event) {
        let (envelope, done) = Envelope::with_ack(event);
        self.event_tx.send(envelope).await.unwrap();
        done.await.unwrap();
    }

    pub async fn send_message(&self, text: &str) {
        self.send(Event::submit(text)).await;
    }

    pub fn state(&self) -> ConvState {
        *self.state_rx.borrow()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.store.messages().await
    }

    /// Everything broadcast so far
    pub fn drain_broadcasts(&mut self) -> Vec<SseEvent> {
        let mut events = vec![];
        while let Ok(event) = self.broadcast_rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// Cancel the session and wait for the runtime task to exit
    pub async fn teardown(self) -> Arc<RecordingStore> {
        self.cancel.cancel();
        self.task.await.unwrap();
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::Author;

    #[tokio::test(start_paused = true)]
    async fn test_effects_reach_store_in_order() {
        let rt = TestRuntime::new().build();
        rt.send(Event::DraftChanged {
            text: "typing".to_string(),
        })
        .await;
        rt.send_message("typing done").await;
        tokio::time::sleep(Duration::from_millis(1001)).await;

        assert_eq!(
            rt.store.recorded_calls(),
            vec![
                StoreCall::SetDraft("typing".to_string()),
                StoreCall::Append(2),
                StoreCall::ClearDraft,
                StoreCall::Append(3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_reply_script() {
        let rt = TestRuntime::new()
            .reply_delay(Duration::from_millis(50))
            .reply_text("beep boop")
            .build();
        rt.send_message("hello robot").await;
        tokio::time::sleep(Duration::from_millis(51)).await;

        let messages = rt.messages().await;
        assert_eq!(messages[0].text, "hi there");
        assert_eq!(messages[2].text, "beep boop");
        assert_eq!(messages[2].author, Author::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_watch_tracks_pending_replies() {
        let rt = TestRuntime::new().build();
        assert_eq!(rt.state(), ConvState::AwaitingInput);

        rt.send_message("one").await;
        tokio::time::sleep(Duration::from_millis(500)).await;
        rt.send_message("two").await;
        assert_eq!(rt.state(), ConvState::ReplyPending { outstanding: 2 });

        // First timer fires at 1000ms, second at 1500ms
        tokio::time::sleep(Duration::from_millis(501)).await;
        assert_eq!(rt.state(), ConvState::ReplyPending { outstanding: 1 });
        assert_eq!(rt.messages().await.len(), 4);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(rt.state(), ConvState::AwaitingInput);
        assert_eq!(rt.messages().await.len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submit_writes_nothing() {
        let mut rt = TestRuntime::new().build();
        rt.send_message("  ").await;
        tokio::time::sleep(Duration::from_millis(1001)).await;

        assert!(rt.store.recorded_calls().is_empty());
        assert!(rt.drain_broadcasts().is_empty());
        assert_eq!(rt.state(), ConvState::AwaitingInput);
    }

    #[tokio::test(start_paused = true)]
    async fn test_broadcasts_follow_effects() {
        let mut rt = TestRuntime::new().build();
        rt.send_message("go").await;
        tokio::time::sleep(Duration::from_millis(1001)).await;

        let kinds: Vec<&'static str> = rt
            .drain_broadcasts()
            .iter()
            .map(|e| match e {
                SseEvent::Message { .. } => "message",
                SseEvent::StateChange { .. } => "state_change",
                SseEvent::Init { .. } => "init",
                SseEvent::Error { .. } => "error",
                SseEvent::Closed => "closed",
            })
            .collect();
        assert_eq!(
            kinds,
            vec!["message", "state_change", "message", "state_change"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_disarms_timers() {
        let rt = TestRuntime::new().build();
        rt.send_message("never answered").await;

        let store = rt.teardown().await;
        tokio::time::sleep(Duration::from_millis(2000)).await;

        let messages = store.messages().await;
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].author, Author::User);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stray_timer_reports_error() {
        let mut rt = TestRuntime::new().build();
        rt.send(Event::reply_fired(42)).await;

        let events = rt.drain_broadcasts();
        assert!(matches!(events.as_slice(), [SseEvent::Error { .. }]));
        assert_eq!(rt.messages().await.len(), 1);
    }
}

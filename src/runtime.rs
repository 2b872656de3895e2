//! Runtime for chat sessions
//!
//! Each session gets its own task running a `ConversationRuntime`; the
//! `SessionManager` owns the handles and is what the HTTP layer talks to.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ConversationRuntime;
pub use traits::*;

use crate::state_machine::{ConvContext, ConvState, Event, Message};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// How often idle sessions are looked for, at most
const REAP_INTERVAL: Duration = Duration::from_secs(60);

/// Type alias for production runtime with concrete implementations
pub type ProductionRuntime = ConversationRuntime<Arc<InMemorySession>>;

/// An event on its way into a runtime, optionally acknowledged once applied
#[derive(Debug)]
pub struct Envelope {
    pub event: Event,
    pub done: Option<oneshot::Sender<()>>,
}

impl Envelope {
    pub fn new(event: Event) -> Self {
        Self { event, done: None }
    }

    pub fn with_ack(event: Event) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                event,
                done: Some(tx),
            },
            rx,
        )
    }
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init {
        messages: Vec<Message>,
        state: ConvState,
    },
    Message {
        message: Message,
    },
    StateChange {
        state: ConvState,
    },
    Error {
        message: String,
    },
    Closed,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),
    #[error("Session closed: {0}")]
    Closed(String),
    #[error("Too many open sessions (limit {0})")]
    CapacityReached(usize),
}

/// Session tuning
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub reply_delay: Duration,
    pub max_sessions: usize,
    /// Sessions untouched this long with no stream attached are closed
    pub idle_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_delay: crate::state_machine::state::DEFAULT_REPLY_DELAY,
            max_sessions: 1024,
            idle_timeout: Duration::from_secs(30 * 60),
        }
    }
}

/// Transcript plus phase, read together
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub state: ConvState,
}

/// Handle to interact with a running session
#[derive(Clone)]
pub struct SessionHandle {
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    state_rx: watch::Receiver<ConvState>,
    store: Arc<InMemorySession>,
    cancel: CancellationToken,
    /// Last time a caller looked the session up
    last_activity: Arc<StdMutex<Instant>>,
}

impl SessionHandle {
    async fn snapshot(&self) -> SessionSnapshot {
        let messages = self.store.messages().await;
        let state = *self.state_rx.borrow();
        SessionSnapshot { messages, state }
    }

    fn touch(&self) {
        *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Idle sessions have no stream attached and no recent calls
    fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        if self.broadcast_tx.receiver_count() > 0 {
            return false;
        }
        let last = *self
            .last_activity
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        now.duration_since(last) > timeout
    }
}

/// Manager for all chat sessions
pub struct SessionManager {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionManager {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Start the background task closing idle sessions
    ///
    /// The task holds a weak reference and exits once the manager is dropped.
    pub fn spawn_reaper(self: &Arc<Self>) -> JoinHandle<()> {
        let period = self.config.idle_timeout.min(REAP_INTERVAL);
        let manager_weak = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                let Some(manager) = manager_weak.upgrade() else {
                    tracing::debug!("SessionManager dropped, reaper exiting");
                    break;
                };
                manager.reap_idle().await;
            }
        })
    }

    /// Close every session idle longer than the configured timeout
    pub async fn reap_idle(&self) -> usize {
        let now = Instant::now();
        let idle: Vec<(String, SessionHandle)> = {
            let mut sessions = self.sessions.write().await;
            let ids: Vec<String> = sessions
                .iter()
                .filter(|(_, handle)| handle.is_idle(now, self.config.idle_timeout))
                .map(|(id, _)| id.clone())
                .collect();
            ids.into_iter()
                .filter_map(|id| sessions.remove(&id).map(|handle| (id, handle)))
                .collect()
        };

        for (session_id, handle) in &idle {
            handle.cancel.cancel();
            tracing::info!(session_id = %session_id, "Closed idle chat session");
        }
        idle.len()
    }

    /// Start a session whose transcript holds only the greeting
    pub async fn create_session(&self) -> Result<String, SessionError> {
        let mut sessions = self.sessions.write().await;
        if sessions.len() >= self.config.max_sessions {
            tracing::warn!(limit = self.config.max_sessions, "Refusing new chat session");
            return Err(SessionError::CapacityReached(self.config.max_sessions));
        }

        let session_id = uuid::Uuid::new_v4().to_string();
        let context = ConvContext::new(&session_id, self.config.reply_delay);
        let store = Arc::new(InMemorySession::seeded(
            context.greeting_message(Utc::now()),
        ));

        let (event_tx, event_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);
        let (state_tx, state_rx) = watch::channel(ConvState::AwaitingInput);
        let cancel = CancellationToken::new();

        let runtime: ProductionRuntime = ConversationRuntime::new(
            context,
            store.clone(),
            event_rx,
            event_tx.clone(),
            broadcast_tx.clone(),
            state_tx,
            cancel.clone(),
        );

        let task_session_id = session_id.clone();
        tokio::spawn(async move {
            runtime.run().await;
            tracing::info!(session_id = %task_session_id, "Chat session finished");
        });

        sessions.insert(
            session_id.clone(),
            SessionHandle {
                event_tx,
                broadcast_tx,
                state_rx,
                store,
                cancel,
                last_activity: Arc::new(StdMutex::new(Instant::now())),
            },
        );

        tracing::info!(session_id = %session_id, open = sessions.len(), "Created chat session");
        Ok(session_id)
    }

    async fn handle(&self, session_id: &str) -> Result<SessionHandle, SessionError> {
        let handle = self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.touch();
        Ok(handle)
    }

    /// Send an event and wait until the runtime has applied it
    async fn dispatch(&self, session_id: &str, event: Event) -> Result<(), SessionError> {
        let handle = self.handle(session_id).await?;
        let (envelope, done) = Envelope::with_ack(event);
        handle
            .event_tx
            .send(envelope)
            .await
            .map_err(|_| SessionError::Closed(session_id.to_string()))?;
        done.await
            .map_err(|_| SessionError::Closed(session_id.to_string()))
    }

    /// Submit user text. Blank text is accepted and silently discarded.
    pub async fn submit(&self, session_id: &str, text: impl Into<String>) -> Result<(), SessionError> {
        let text = text.into();
        if text.trim().is_empty() {
            tracing::debug!(session_id = %session_id, "Discarding blank submission");
        }
        self.dispatch(session_id, Event::submit(text)).await
    }

    /// Replace the session's input buffer
    pub async fn set_draft(&self, session_id: &str, text: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(session_id, Event::DraftChanged { text: text.into() })
            .await
    }

    pub async fn draft(&self, session_id: &str) -> Result<String, SessionError> {
        Ok(self.handle(session_id).await?.store.draft().await)
    }

    /// Current full transcript; calling it again without new events yields the same list
    pub async fn list_messages(&self, session_id: &str) -> Result<Vec<Message>, SessionError> {
        Ok(self.handle(session_id).await?.store.messages().await)
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, SessionError> {
        Ok(self.handle(session_id).await?.snapshot().await)
    }

    /// Subscribe to session updates along with the state they start from
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), SessionError> {
        let handle = self.handle(session_id).await?;
        // Subscribe before reading so nothing lands in between unseen
        let rx = handle.broadcast_tx.subscribe();
        Ok((handle.snapshot().await, rx))
    }

    /// Tear a session down. Armed reply timers are disarmed and any that
    /// still fire are dropped by the state machine.
    pub async fn close(&self, session_id: &str) -> Result<(), SessionError> {
        let handle = self
            .sessions
            .write()
            .await
            .remove(session_id)
            .ok_or_else(|| SessionError::NotFound(session_id.to_string()))?;
        handle.cancel.cancel();
        tracing::info!(session_id = %session_id, "Closed chat session");
        Ok(())
    }

    /// Tear down every session (used on shutdown)
    pub async fn close_all(&self) {
        let drained: Vec<(String, SessionHandle)> = self.sessions.write().await.drain().collect();
        for (session_id, handle) in &drained {
            handle.cancel.cancel();
            tracing::debug!(session_id = %session_id, "Closed chat session on shutdown");
        }
        tracing::info!(count = drained.len(), "Closed all chat sessions");
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // Runtimes only exit through their token
        let sessions = self.sessions.get_mut();
        for handle in sessions.values() {
            handle.cancel.cancel();
        }
        tracing::debug!(count = sessions.len(), "SessionManager dropped, sessions cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::state::{Author, GREETING, SCRIPTED_REPLY};

    fn manager() -> SessionManager {
        SessionManager::new(SessionConfig::default())
    }

    async fn let_replies_land() {
        tokio::time::sleep(Duration::from_millis(1001)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_holds_greeting() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();

        let messages = mgr.list_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].id, 1);
        assert_eq!(messages[0].author, Author::Assistant);
        assert_eq!(messages[0].text, GREETING);
    }

    #[tokio::test(start_paused = true)]
    async fn test_build_a_drone_scenario() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();

        mgr.submit(&id, "build a drone").await.unwrap();
        let messages = mgr.list_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].id, 2);
        assert_eq!(messages[1].author, Author::User);
        assert_eq!(messages[1].text, "build a drone");
        assert!(mgr.snapshot(&id).await.unwrap().state.is_reply_pending());

        let_replies_land().await;

        let messages = mgr.list_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].id, 3);
        assert_eq!(messages[2].author, Author::Assistant);
        assert_eq!(messages[2].text, SCRIPTED_REPLY);
        assert_eq!(mgr.snapshot(&id).await.unwrap().state, ConvState::AwaitingInput);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_waits_for_delay() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        mgr.submit(&id, "hello").await.unwrap();

        tokio::time::sleep(Duration::from_millis(999)).await;
        assert_eq!(mgr.list_messages(&id).await.unwrap().len(), 2);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(mgr.list_messages(&id).await.unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_submits() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();

        mgr.submit(&id, "a").await.unwrap();
        mgr.submit(&id, "b").await.unwrap();

        let messages = mgr.list_messages(&id).await.unwrap();
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(
            mgr.snapshot(&id).await.unwrap().state,
            ConvState::ReplyPending { outstanding: 2 }
        );

        let_replies_land().await;

        let messages = mgr.list_messages(&id).await.unwrap();
        assert_eq!(messages.len(), 5);
        let authors: Vec<Author> = messages.iter().map(|m| m.author).collect();
        assert_eq!(
            authors,
            vec![
                Author::Assistant,
                Author::User,
                Author::User,
                Author::Assistant,
                Author::Assistant
            ]
        );
        let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_submissions_are_discarded() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        mgr.set_draft(&id, "keep me").await.unwrap();

        mgr.submit(&id, "").await.unwrap();
        mgr.submit(&id, "   ").await.unwrap();
        let_replies_land().await;

        assert_eq!(mgr.list_messages(&id).await.unwrap().len(), 1);
        assert_eq!(mgr.draft(&id).await.unwrap(), "keep me");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_clears_draft() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        mgr.set_draft(&id, "build a robot").await.unwrap();
        assert_eq!(mgr.draft(&id).await.unwrap(), "build a robot");

        mgr.submit(&id, "build a robot").await.unwrap();
        assert!(mgr.draft(&id).await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_messages_is_idempotent() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        mgr.submit(&id, "x").await.unwrap();

        let first = mgr.list_messages(&id).await.unwrap();
        let second = mgr.list_messages(&id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_drops_pending_reply() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        mgr.submit(&id, "about to leave").await.unwrap();
        let (_, mut rx) = mgr.subscribe(&id).await.unwrap();

        mgr.close(&id).await.unwrap();
        let_replies_land().await;

        assert!(matches!(
            mgr.list_messages(&id).await,
            Err(SessionError::NotFound(_))
        ));
        // Nothing but the closed notification was broadcast after teardown
        let mut saw_closed = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                SseEvent::Closed => saw_closed = true,
                SseEvent::Message { message } => {
                    panic!("message {} landed after teardown", message.id)
                }
                _ => {}
            }
        }
        assert!(saw_closed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_session() {
        let mgr = manager();
        assert!(matches!(
            mgr.submit("nope", "hi").await,
            Err(SessionError::NotFound(_))
        ));
        assert!(matches!(mgr.close("nope").await, Err(SessionError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_cap() {
        let mgr = SessionManager::new(SessionConfig {
            max_sessions: 2,
            ..SessionConfig::default()
        });
        mgr.create_session().await.unwrap();
        let second = mgr.create_session().await.unwrap();
        assert!(matches!(
            mgr.create_session().await,
            Err(SessionError::CapacityReached(2))
        ));

        mgr.close(&second).await.unwrap();
        assert!(mgr.create_session().await.is_ok());
        assert_eq!(mgr.session_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_streams_turns() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        let (snapshot, mut rx) = mgr.subscribe(&id).await.unwrap();
        assert_eq!(snapshot.messages.len(), 1);

        mgr.submit(&id, "stream me").await.unwrap();
        let_replies_land().await;

        let mut turns = vec![];
        while let Ok(event) = rx.try_recv() {
            if let SseEvent::Message { message } = event {
                turns.push((message.id, message.author));
            }
        }
        assert_eq!(turns, vec![(2, Author::User), (3, Author::Assistant)]);
    }

    fn idle_config(max_sessions: usize) -> SessionConfig {
        SessionConfig {
            max_sessions,
            idle_timeout: Duration::from_secs(600),
            ..SessionConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_sessions_free_their_slots() {
        let mgr = Arc::new(SessionManager::new(idle_config(2)));
        let _reaper = mgr.spawn_reaper();
        mgr.create_session().await.unwrap();
        mgr.create_session().await.unwrap();
        assert!(matches!(
            mgr.create_session().await,
            Err(SessionError::CapacityReached(2))
        ));

        tokio::time::sleep(Duration::from_secs(86_400)).await;

        assert_eq!(mgr.session_count().await, 0);
        assert!(mgr.create_session().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reap_spares_active_sessions() {
        let mgr = SessionManager::new(idle_config(8));
        let busy = mgr.create_session().await.unwrap();
        let watched = mgr.create_session().await.unwrap();
        let abandoned = mgr.create_session().await.unwrap();
        let (_, _rx) = mgr.subscribe(&watched).await.unwrap();

        tokio::time::sleep(Duration::from_secs(400)).await;
        mgr.submit(&busy, "still here").await.unwrap();
        tokio::time::sleep(Duration::from_secs(400)).await;

        assert_eq!(mgr.reap_idle().await, 1);
        assert!(mgr.list_messages(&busy).await.is_ok());
        assert!(mgr.list_messages(&watched).await.is_ok());
        assert!(matches!(
            mgr.list_messages(&abandoned).await,
            Err(SessionError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attached_stream_keeps_session_alive() {
        let mgr = SessionManager::new(idle_config(8));
        let id = mgr.create_session().await.unwrap();
        let (_, rx) = mgr.subscribe(&id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(601)).await;

        assert_eq!(mgr.reap_idle().await, 0);
        drop(rx);
        assert_eq!(mgr.reap_idle().await, 1);
        assert_eq!(mgr.session_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_runtimes() {
        let mgr = manager();
        let id = mgr.create_session().await.unwrap();
        let (_, mut rx) = mgr.subscribe(&id).await.unwrap();

        drop(mgr);

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, SseEvent::Closed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_all() {
        let mgr = manager();
        mgr.create_session().await.unwrap();
        mgr.create_session().await.unwrap();
        mgr.close_all().await;
        assert_eq!(mgr.session_count().await, 0);
    }
}

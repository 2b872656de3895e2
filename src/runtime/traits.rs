//! Trait abstractions for runtime storage
//!
//! The executor only talks to these traits so a durable backend can replace
//! the in-memory session store without touching the state machine.

use crate::state_machine::Message;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Append-only transcript storage
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Append a turn to the end of the transcript
    async fn append(&self, message: Message);

    /// Full transcript, oldest first
    async fn messages(&self) -> Vec<Message>;

    /// Id of the newest turn, 0 if empty
    async fn last_id(&self) -> u64;
}

/// Storage for the pending input text
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn set_draft(&self, text: String);

    async fn clear_draft(&self);

    async fn draft(&self) -> String;
}

/// Combined storage trait for convenience
pub trait Storage: MessageStore + DraftStore {}
impl<T: MessageStore + DraftStore> Storage for T {}

// ============================================================================
// In-memory session storage
// ============================================================================

/// Transcript and draft for one session, discarded with the session
#[derive(Debug, Default)]
pub struct InMemorySession {
    messages: RwLock<Vec<Message>>,
    draft: RwLock<String>,
}

impl InMemorySession {
    /// Start a transcript that already holds `seed`
    pub fn seeded(seed: Message) -> Self {
        Self {
            messages: RwLock::new(vec![seed]),
            draft: RwLock::new(String::new()),
        }
    }
}

#[async_trait]
impl MessageStore for InMemorySession {
    async fn append(&self, message: Message) {
        let mut messages = self.messages.write().await;
        debug_assert!(
            messages.last().map_or(true, |last| last.id < message.id),
            "transcript ids must increase"
        );
        messages.push(message);
    }

    async fn messages(&self) -> Vec<Message> {
        self.messages.read().await.clone()
    }

    async fn last_id(&self) -> u64 {
        self.messages.read().await.last().map_or(0, |m| m.id)
    }
}

#[async_trait]
impl DraftStore for InMemorySession {
    async fn set_draft(&self, text: String) {
        *self.draft.write().await = text;
    }

    async fn clear_draft(&self) {
        self.draft.write().await.clear();
    }

    async fn draft(&self) -> String {
        self.draft.read().await.clone()
    }
}

// ============================================================================
// Arc implementations for shared stores
// ============================================================================

#[async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn append(&self, message: Message) {
        (**self).append(message).await;
    }

    async fn messages(&self) -> Vec<Message> {
        (**self).messages().await
    }

    async fn last_id(&self) -> u64 {
        (**self).last_id().await
    }
}

#[async_trait]
impl<T: DraftStore + ?Sized> DraftStore for Arc<T> {
    async fn set_draft(&self, text: String) {
        (**self).set_draft(text).await;
    }

    async fn clear_draft(&self) {
        (**self).clear_draft().await;
    }

    async fn draft(&self) -> String {
        (**self).draft().await
    }
}

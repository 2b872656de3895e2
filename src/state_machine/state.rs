//! Conversation state types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delay between a user turn and its scripted reply
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Assistant turn seeded into every new conversation
pub const GREETING: &str = "Hello! I'm your TechCraft Genius AI assistant. I can help you find \
projects, merge concepts, optimize costs, and create custom solutions. What would you like to \
build today?";

/// Canned assistant turn, independent of what the user wrote
pub const SCRIPTED_REPLY: &str = "I understand you're interested in that project! Let me analyze \
the requirements and suggest the best approach. Based on my continuous learning, I can recommend \
optimal components and provide step-by-step guidance.";

// ============================================================================
// Messages
// ============================================================================

/// Who wrote a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    User,
    Assistant,
}

/// One turn of the transcript. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// 1-based, strictly increasing within a session
    pub id: u64,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(id: u64, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author: Author::User,
            text: text.into(),
            created_at,
        }
    }

    pub fn assistant(id: u64, text: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            author: Author::Assistant,
            text: text.into(),
            created_at,
        }
    }
}

// ============================================================================
// Conversation State
// ============================================================================

/// Conversation phase
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConvState {
    /// No reply timer armed
    #[default]
    AwaitingInput,

    /// One or more scripted replies are scheduled but have not landed yet.
    /// Overlapping submits each arm their own timer.
    ReplyPending { outstanding: u32 },

    /// Session torn down - every later event is ignored or rejected
    Closed,
}

impl ConvState {
    pub fn is_closed(&self) -> bool {
        matches!(self, ConvState::Closed)
    }

    pub fn is_reply_pending(&self) -> bool {
        matches!(self, ConvState::ReplyPending { .. })
    }

    /// Number of armed reply timers
    pub fn outstanding_replies(&self) -> u32 {
        match self {
            ConvState::ReplyPending { outstanding } => *outstanding,
            ConvState::AwaitingInput | ConvState::Closed => 0,
        }
    }

    /// Short name used in logs and client notifications
    pub fn name(&self) -> &'static str {
        match self {
            ConvState::AwaitingInput => "awaiting_input",
            ConvState::ReplyPending { .. } => "reply_pending",
            ConvState::Closed => "closed",
        }
    }
}

/// Context for a conversation (immutable configuration)
#[derive(Debug, Clone)]
pub struct ConvContext {
    pub session_id: String,
    pub reply_delay: Duration,
    pub greeting: String,
    pub reply_text: String,
}

impl ConvContext {
    pub fn new(session_id: impl Into<String>, reply_delay: Duration) -> Self {
        Self {
            session_id: session_id.into(),
            reply_delay,
            greeting: GREETING.to_string(),
            reply_text: SCRIPTED_REPLY.to_string(),
        }
    }

    /// Replace the greeting and the canned reply
    #[allow(dead_code)] // Used by tests and alternate scripts
    pub fn with_script(mut self, greeting: impl Into<String>, reply_text: impl Into<String>) -> Self {
        self.greeting = greeting.into();
        self.reply_text = reply_text.into();
        self
    }

    /// The assistant turn every transcript starts with
    pub fn greeting_message(&self, at: DateTime<Utc>) -> Message {
        Message::assistant(1, self.greeting.clone(), at)
    }
}

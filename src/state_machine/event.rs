//! Events that can occur in a conversation

use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // User events
    UserSubmit {
        text: String,
        at: DateTime<Utc>,
    },
    DraftChanged {
        text: String,
    },

    // Timer events
    ReplyTimerFired {
        /// Id of the user turn that armed the timer
        ticket: u64,
        at: DateTime<Utc>,
    },

    // Lifecycle
    Teardown,
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::UserSubmit {
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn reply_fired(ticket: u64) -> Self {
        Event::ReplyTimerFired {
            ticket,
            at: Utc::now(),
        }
    }
}

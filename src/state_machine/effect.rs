//! Effects produced by state transitions

use super::state::{ConvState, Message};
use std::time::Duration;

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Append a turn to the transcript
    AppendMessage { message: Message },

    /// Replace the input buffer
    SetDraft { text: String },

    /// Empty the input buffer
    ClearDraft,

    /// Arm a reply timer that posts `ReplyTimerFired { ticket }` after `delay`
    ScheduleReply { ticket: u64, delay: Duration },

    /// Disarm every reply timer owned by the session
    CancelReplies,

    /// Notify connected clients of the new phase
    NotifyStateChange { state: ConvState },

    /// Notify connected clients that the session is gone
    NotifyClosed,
}

impl Effect {
    pub fn append(message: Message) -> Self {
        Effect::AppendMessage { message }
    }

    pub fn notify_state_change(state: ConvState) -> Self {
        Effect::NotifyStateChange { state }
    }
}

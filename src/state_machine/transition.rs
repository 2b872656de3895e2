//! Pure state transition function

use super::{ConvContext, ConvState, Effect, Event, Message};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: ConvState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: ConvState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Whether this transition changed nothing
    pub fn is_noop(&self, previous: &ConvState) -> bool {
        self.effects.is_empty() && self.new_state == *previous
    }
}

/// Errors that can occur during transition
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Session is closed")]
    SessionClosed,
    #[error("Reply timer {0} fired with no reply pending")]
    NoReplyPending(u64),
}

/// Pure transition function
///
/// Given the same inputs it always produces the same outputs, with no I/O.
/// `last_id` is the id of the newest turn in the transcript; new turns take
/// `last_id + 1`, so a reply's id is decided when its timer fires, not when
/// it was scheduled.
pub fn transition(
    state: &ConvState,
    context: &ConvContext,
    last_id: u64,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state, event) {
        // ============================================================
        // Closed: late timers are dropped, user input is refused
        // ============================================================
        (ConvState::Closed, Event::ReplyTimerFired { .. } | Event::Teardown) => {
            Ok(TransitionResult::new(ConvState::Closed))
        }

        (ConvState::Closed, Event::UserSubmit { .. } | Event::DraftChanged { .. }) => {
            Err(TransitionError::SessionClosed)
        }

        // ============================================================
        // User submit
        // ============================================================

        // Blank input is discarded without a trace; the draft is left alone
        (_, Event::UserSubmit { text, .. }) if text.trim().is_empty() => {
            Ok(TransitionResult::new(*state))
        }

        (ConvState::AwaitingInput | ConvState::ReplyPending { .. }, Event::UserSubmit { text, at }) => {
            let id = last_id + 1;
            let new_state = ConvState::ReplyPending {
                outstanding: state.outstanding_replies().saturating_add(1),
            };

            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(Message::user(id, text, at)))
                .with_effect(Effect::ClearDraft)
                .with_effect(Effect::ScheduleReply {
                    ticket: id,
                    delay: context.reply_delay,
                })
                .with_effect(Effect::notify_state_change(new_state)))
        }

        // ============================================================
        // Input buffer
        // ============================================================
        (_, Event::DraftChanged { text }) => {
            Ok(TransitionResult::new(*state).with_effect(Effect::SetDraft { text }))
        }

        // ============================================================
        // Scripted reply lands
        // ============================================================
        (ConvState::ReplyPending { outstanding }, Event::ReplyTimerFired { at, .. }) => {
            let new_state = match outstanding.saturating_sub(1) {
                0 => ConvState::AwaitingInput,
                remaining => ConvState::ReplyPending {
                    outstanding: remaining,
                },
            };

            Ok(TransitionResult::new(new_state)
                .with_effect(Effect::append(Message::assistant(
                    last_id + 1,
                    context.reply_text.clone(),
                    at,
                )))
                .with_effect(Effect::notify_state_change(new_state)))
        }

        (ConvState::AwaitingInput, Event::ReplyTimerFired { ticket, .. }) => {
            Err(TransitionError::NoReplyPending(ticket))
        }

        // ============================================================
        // Teardown
        // ============================================================
        (ConvState::AwaitingInput | ConvState::ReplyPending { .. }, Event::Teardown) => {
            Ok(TransitionResult::new(ConvState::Closed)
                .with_effect(Effect::CancelReplies)
                .with_effect(Effect::NotifyClosed))
        }
    }
}

//! Property-based tests for the state machine
//!
//! These tests drive the pure transition function with arbitrary event
//! sequences against a model transcript and check the invariants hold.

use super::state::*;
use super::transition::*;
use super::*;
use chrono::{TimeZone, Utc};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_context() -> ConvContext {
    ConvContext::new("prop-session", DEFAULT_REPLY_DELAY)
}

/// Minimal stand-in for the runtime: applies effects to a vector
struct Model {
    state: ConvState,
    transcript: Vec<Message>,
    draft: String,
    armed: Vec<u64>,
}

impl Model {
    fn new(ctx: &ConvContext) -> Self {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Self {
            state: ConvState::AwaitingInput,
            transcript: vec![ctx.greeting_message(at)],
            draft: String::new(),
            armed: vec![],
        }
    }

    fn last_id(&self) -> u64 {
        self.transcript.last().map_or(0, |m| m.id)
    }

    fn apply(&mut self, ctx: &ConvContext, event: Event) -> Result<TransitionResult, TransitionError> {
        let result = transition(&self.state, ctx, self.last_id(), event)?;
        self.state = result.new_state;
        for effect in &result.effects {
            match effect {
                Effect::AppendMessage { message } => self.transcript.push(message.clone()),
                Effect::SetDraft { text } => self.draft.clone_from(text),
                Effect::ClearDraft => self.draft.clear(),
                Effect::ScheduleReply { ticket, .. } => self.armed.push(*ticket),
                Effect::CancelReplies => self.armed.clear(),
                Effect::NotifyStateChange { .. } | Effect::NotifyClosed => {}
            }
        }
        Ok(result)
    }

    /// Fire the oldest armed timer, like equal-delay timers would
    fn fire_next(&mut self, ctx: &ConvContext) -> Option<Result<TransitionResult, TransitionError>> {
        if self.armed.is_empty() {
            return None;
        }
        let ticket = self.armed.remove(0);
        Some(self.apply(ctx, Event::reply_fired(ticket)))
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

#[derive(Debug, Clone)]
enum Step {
    Submit(String),
    Draft(String),
    Fire,
}

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z ]{1,30}",
        Just(String::new()),
        "[ \t\n]{1,5}",
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => arb_text().prop_map(Step::Submit),
        1 => "[a-z ]{0,10}".prop_map(Step::Draft),
        2 => Just(Step::Fire),
    ]
}

fn arb_steps() -> impl Strategy<Value = Vec<Step>> {
    proptest::collection::vec(arb_step(), 0..40)
}

fn run_steps(ctx: &ConvContext, model: &mut Model, steps: &[Step]) {
    for step in steps {
        match step {
            Step::Submit(text) => {
                model.apply(ctx, Event::submit(text.clone())).unwrap();
            }
            Step::Draft(text) => {
                model
                    .apply(ctx, Event::DraftChanged { text: text.clone() })
                    .unwrap();
            }
            Step::Fire => {
                if let Some(result) = model.fire_next(ctx) {
                    result.unwrap();
                }
            }
        }
    }
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_ids_strictly_increase(steps in arb_steps()) {
        let ctx = test_context();
        let mut model = Model::new(&ctx);
        run_steps(&ctx, &mut model, &steps);

        for pair in model.transcript.windows(2) {
            prop_assert!(pair[0].id < pair[1].id);
            prop_assert_eq!(pair[1].id, pair[0].id + 1);
        }
        prop_assert_eq!(model.transcript[0].id, 1);
    }

    #[test]
    fn prop_submit_grows_transcript_by_one_iff_non_blank(
        steps in arb_steps(),
        text in arb_text(),
    ) {
        let ctx = test_context();
        let mut model = Model::new(&ctx);
        run_steps(&ctx, &mut model, &steps);

        let before = model.transcript.len();
        model.apply(&ctx, Event::submit(text.clone())).unwrap();
        let after = model.transcript.len();

        if text.trim().is_empty() {
            prop_assert_eq!(after, before);
        } else {
            prop_assert_eq!(after, before + 1);
            let last = model.transcript.last().unwrap();
            prop_assert_eq!(last.author, Author::User);
            prop_assert_eq!(&last.text, &text);
            prop_assert!(model.draft.is_empty());
        }
    }

    #[test]
    fn prop_every_user_turn_gets_exactly_one_reply(steps in arb_steps()) {
        let ctx = test_context();
        let mut model = Model::new(&ctx);
        run_steps(&ctx, &mut model, &steps);

        // Drain remaining timers
        while let Some(result) = model.fire_next(&ctx) {
            result.unwrap();
        }

        let users = model.transcript.iter().filter(|m| m.author == Author::User).count();
        let assistants = model
            .transcript
            .iter()
            .filter(|m| m.author == Author::Assistant)
            .count();
        // The greeting is the one unpaired assistant turn
        prop_assert_eq!(assistants, users + 1);
        prop_assert_eq!(model.state, ConvState::AwaitingInput);
    }

    #[test]
    fn prop_outstanding_matches_armed_timers(steps in arb_steps()) {
        let ctx = test_context();
        let mut model = Model::new(&ctx);
        run_steps(&ctx, &mut model, &steps);

        prop_assert_eq!(model.state.outstanding_replies() as usize, model.armed.len());
        prop_assert_eq!(model.state.is_reply_pending(), !model.armed.is_empty());
    }

    #[test]
    fn prop_nothing_lands_after_teardown(steps in arb_steps(), late in arb_steps()) {
        let ctx = test_context();
        let mut model = Model::new(&ctx);
        run_steps(&ctx, &mut model, &steps);

        // Remember what was armed before teardown; those timers may still fire
        let stale = model.armed.clone();
        model.apply(&ctx, Event::Teardown).unwrap();
        let frozen = model.transcript.clone();

        for ticket in stale {
            let result = model.apply(&ctx, Event::reply_fired(ticket)).unwrap();
            prop_assert!(result.is_noop(&ConvState::Closed));
        }
        for step in late {
            let event = match step {
                Step::Submit(text) => Event::submit(text),
                Step::Draft(text) => Event::DraftChanged { text },
                Step::Fire => Event::reply_fired(0),
            };
            let _ = model.apply(&ctx, event);
        }

        prop_assert_eq!(&model.transcript, &frozen);
        prop_assert!(model.state.is_closed());
    }

    #[test]
    fn prop_transition_is_deterministic(steps in arb_steps(), text in arb_text()) {
        let ctx = test_context();
        let mut model = Model::new(&ctx);
        run_steps(&ctx, &mut model, &steps);

        let event = Event::submit(text);
        let a = transition(&model.state, &ctx, model.last_id(), event.clone());
        let b = transition(&model.state, &ctx, model.last_id(), event);
        match (a, b) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.new_state, b.new_state);
                prop_assert_eq!(a.effects, b.effects);
            }
            (Err(a), Err(b)) => prop_assert_eq!(a, b),
            _ => prop_assert!(false, "same input produced different outcomes"),
        }
    }
}

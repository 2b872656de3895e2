//! Conversation runtime executor

use super::traits::Storage;
use super::{Envelope, SseEvent};
use crate::state_machine::{transition, ConvContext, ConvState, Effect, Event};
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio_util::sync::CancellationToken;

/// Drives one chat session: feeds events through the state machine and
/// applies the resulting effects. It is the only writer of its storage.
pub struct ConversationRuntime<S>
where
    S: Storage + 'static,
{
    context: ConvContext,
    state: ConvState,
    /// Id of the newest turn in storage
    last_id: u64,
    storage: S,
    event_rx: mpsc::Receiver<Envelope>,
    /// Handed to reply timers so they can post back into the loop
    event_tx: mpsc::Sender<Envelope>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    state_tx: watch::Sender<ConvState>,
    /// Session lifetime; every reply timer holds a child of it
    cancel: CancellationToken,
}

impl<S> ConversationRuntime<S>
where
    S: Storage + 'static,
{
    pub fn new(
        context: ConvContext,
        storage: S,
        event_rx: mpsc::Receiver<Envelope>,
        event_tx: mpsc::Sender<Envelope>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        state_tx: watch::Sender<ConvState>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            context,
            state: ConvState::AwaitingInput,
            last_id: 0,
            storage,
            event_rx,
            event_tx,
            broadcast_tx,
            state_tx,
            cancel,
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, "Starting conversation runtime");
        self.last_id = self.storage.last_id().await;

        loop {
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    self.process_event(Event::Teardown).await;
                    break;
                }
                Some(envelope) = self.event_rx.recv() => {
                    let Envelope { event, done } = envelope;
                    self.process_event(event).await;
                    if let Some(done) = done {
                        let _ = done.send(());
                    }
                    if self.state.is_closed() {
                        break;
                    }
                }
                else => break,
            }
        }

        tracing::info!(session_id = %self.context.session_id, "Conversation runtime stopped");
    }

    async fn process_event(&mut self, event: Event) {
        let result = match transition(&self.state, &self.context, self.last_id, event) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    state = self.state.name(),
                    error = %e,
                    "Rejected event"
                );
                let _ = self.broadcast_tx.send(SseEvent::Error {
                    message: e.to_string(),
                });
                return;
            }
        };

        if result.is_noop(&self.state) {
            tracing::debug!(session_id = %self.context.session_id, "Event ignored");
            return;
        }

        let old_state = std::mem::replace(&mut self.state, result.new_state);
        if old_state != self.state {
            tracing::debug!(
                session_id = %self.context.session_id,
                from = old_state.name(),
                to = self.state.name(),
                outstanding = self.state.outstanding_replies(),
                "State transition"
            );
            self.state_tx.send_replace(self.state);
        }

        for effect in result.effects {
            self.execute_effect(effect).await;
        }
    }

    async fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::AppendMessage { message } => {
                self.last_id = message.id;
                self.storage.append(message.clone()).await;
                let _ = self.broadcast_tx.send(SseEvent::Message { message });
            }
            Effect::SetDraft { text } => self.storage.set_draft(text).await,
            Effect::ClearDraft => self.storage.clear_draft().await,
            Effect::ScheduleReply { ticket, delay } => self.arm_reply_timer(ticket, delay),
            Effect::CancelReplies => {
                // Children (the reply timers) are cancelled with the parent
                self.cancel.cancel();
            }
            Effect::NotifyStateChange { state } => {
                let _ = self.broadcast_tx.send(SseEvent::StateChange { state });
            }
            Effect::NotifyClosed => {
                let _ = self.broadcast_tx.send(SseEvent::Closed);
            }
        }
    }

    fn arm_reply_timer(&self, ticket: u64, delay: Duration) {
        let event_tx = self.event_tx.clone();
        let cancel = self.cancel.child_token();
        let session_id = self.context.session_id.clone();

        tracing::debug!(session_id = %session_id, ticket, ?delay, "Arming reply timer");

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {
                    tracing::debug!(session_id = %session_id, ticket, "Reply timer disarmed");
                }
                () = tokio::time::sleep(delay) => {
                    // The runtime may already be gone; nothing to deliver to then
                    let _ = event_tx.send(Envelope::new(Event::reply_fired(ticket))).await;
                }
            }
        });
    }
}

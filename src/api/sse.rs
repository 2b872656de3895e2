//! Server-Sent Events support

use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
///
/// The stream ends after the session reports it has closed.
pub fn sse_stream(
    init_event: SseEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { init_event });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(event),
        Err(_) => None, // Skip lagged messages
    });

    let mut closed = false;
    let combined = init
        .chain(broadcasts)
        .take_while(move |event| {
            // Let the closed event itself through, then stop
            let keep = !closed;
            closed |= matches!(event, SseEvent::Closed);
            keep
        })
        .map(|event| Ok(sse_event_to_axum(event)));

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn sse_event_to_axum(event: SseEvent) -> Event {
    let (event_type, data) = match event {
        SseEvent::Init { messages, state } => (
            "init",
            json!({
                "type": "init",
                "messages": messages,
                "state": state,
                "reply_pending": state.is_reply_pending()
            }),
        ),
        SseEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        SseEvent::StateChange { state } => (
            "state_change",
            json!({
                "type": "state_change",
                "state": state
            }),
        ),
        SseEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
        SseEvent::Closed => (
            "closed",
            json!({
                "type": "closed"
            }),
        ),
    };

    Event::default().event(event_type).data(data.to_string())
}

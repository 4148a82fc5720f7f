use async_trait::async_trait;
use axum::response::sse::Event;
use concierge_core::{AgentEvent, RunHandle};
use futures::stream::{Stream, StreamExt};
use serde::Serialize;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tracing::error;

/// Trait for formatting AgentEvents into API-specific wire frames
#[async_trait]
pub trait EventFormatter: Send {
    type Output: Serialize + Send;

    /// Convert an AgentEvent to the wire format.
    /// Returns None if the event should be filtered out.
    async fn format_event(&mut self, event: AgentEvent, thread_id: &str) -> Option<Self::Output>;

    /// Get the SSE event name for this output
    /// Default is "message"
    fn event_name(&self, _output: &Self::Output) -> &str {
        "message"
    }
}

/// Create an SSE stream from a spawned run.
/// Formats events until the run's terminal event, then ends the stream.
/// The handle stays in the stream state so the run is aborted if the
/// client disconnects mid-stream.
pub fn run_to_sse_stream<F>(
    mut handle: RunHandle,
    formatter: F,
    thread_id: String,
) -> impl Stream<Item = Result<Event, Infallible>>
where
    F: EventFormatter + 'static,
{
    // A handle that was already streamed yields an immediately-closed
    // channel, so the stream just ends.
    let event_rx = handle.take_events().unwrap_or_else(|| {
        let (tx, rx) = tokio::sync::broadcast::channel(1);
        drop(tx);
        rx
    });

    futures::stream::unfold(
        (BroadcastStream::new(event_rx), formatter, false, handle),
        move |state| {
            let thread_id = thread_id.clone();
            async move {
                let (mut rx, mut fmt, done, handle) = state;

                if done {
                    return None;
                }

                loop {
                    match rx.next().await {
                        Some(Ok(event)) => {
                            let is_terminal = event.is_terminal();
                            let formatted = fmt.format_event(event, &thread_id).await;
                            let new_done = if is_terminal { true } else { done };

                            if let Some(output) = formatted {
                                match serde_json::to_string(&output) {
                                    Ok(json) => {
                                        let name = fmt.event_name(&output).to_string();
                                        let sse_event = Event::default().event(name).data(json);
                                        return Some((
                                            Ok(sse_event),
                                            (rx, fmt, new_done, handle),
                                        ));
                                    }
                                    Err(e) => {
                                        error!("[{}] Failed to serialize event: {}", thread_id, e);
                                        if new_done {
                                            return None;
                                        }
                                        continue;
                                    }
                                }
                            } else {
                                if new_done {
                                    return None;
                                }
                                continue;
                            }
                        }
                        Some(Err(e)) => {
                            error!("[{}] Error receiving event: {}", thread_id, e);
                            return None;
                        }
                        None => {
                            return None;
                        }
                    }
                }
            }
        },
    )
}

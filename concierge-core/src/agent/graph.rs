use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{AgentEvent, Message, Role};
use crate::error::AgentError;

/// An externally-constructed conversational workflow.
/// Graphs are opaque to the server: it only knows their name, their
/// description, and how to run them against a transcript.
#[async_trait]
pub trait AgentGraph: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;

    /// Execute one run. Progress goes out through `ctx`; the returned
    /// string becomes the final assistant message of the run.
    async fn run(&self, ctx: &RunContext) -> Result<String, AgentError>;
}

/// Everything a graph sees for a single run: the inbound transcript, the
/// prior thread state, and the event emitter.
pub struct RunContext {
    pub thread_id: String,
    pub run_id: String,
    pub messages: Vec<Message>,
    pub state: serde_json::Value,
    events: broadcast::Sender<AgentEvent>,
}

impl RunContext {
    pub fn new(
        thread_id: String,
        run_id: String,
        messages: Vec<Message>,
        state: serde_json::Value,
        events: broadcast::Sender<AgentEvent>,
    ) -> Self {
        Self {
            thread_id,
            run_id,
            messages,
            state,
            events,
        }
    }

    /// Emit an event to all subscribers.
    /// Fails once every receiver is gone, which stops abandoned runs.
    pub fn emit(&self, event: AgentEvent) -> Result<(), AgentError> {
        self.events
            .send(event)
            .map(|_| ())
            .map_err(|_| AgentError::ChannelClosed)
    }

    /// Emit a chunk of streamed assistant text
    pub fn text(&self, delta: impl Into<String>) -> Result<(), AgentError> {
        self.emit(AgentEvent::TextDelta {
            run_id: self.run_id.clone(),
            delta: delta.into(),
        })
    }

    /// Publish the graph's structured state
    pub fn snapshot(&self, state: serde_json::Value) -> Result<(), AgentError> {
        self.emit(AgentEvent::StateSnapshot {
            thread_id: self.thread_id.clone(),
            run_id: self.run_id.clone(),
            state,
        })
    }

    /// Most recent user message of the transcript, if any
    pub fn latest_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context_with(messages: Vec<Message>) -> (RunContext, broadcast::Receiver<AgentEvent>) {
        let (tx, rx) = broadcast::channel(16);
        let ctx = RunContext::new(
            "thread".into(),
            "run".into(),
            messages,
            serde_json::json!({}),
            tx,
        );
        (ctx, rx)
    }

    #[test]
    fn latest_user_message_skips_assistant_turns() {
        let (ctx, _rx) = context_with(vec![
            Message::user("book me a flight"),
            Message::assistant("where to?"),
            Message::user("to Lisbon"),
        ]);
        assert_eq!(ctx.latest_user_message(), Some("to Lisbon"));
    }

    #[test]
    fn emit_fails_without_receivers() {
        let (ctx, rx) = context_with(vec![]);
        drop(rx);
        assert!(matches!(ctx.text("hi"), Err(AgentError::ChannelClosed)));
    }

    #[test]
    fn text_reaches_subscriber() {
        let (ctx, mut rx) = context_with(vec![]);
        ctx.text("hello").unwrap();
        match rx.try_recv().unwrap() {
            AgentEvent::TextDelta { delta, .. } => assert_eq!(delta, "hello"),
            other => panic!("unexpected event: {other:?}"),
        }
    }
}

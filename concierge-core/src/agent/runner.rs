use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};
use uuid::Uuid;

use super::{AgentEvent, AgentGraph, Message, RunContext};
use crate::error::AgentError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A single spawned agent run.
/// Holds the primary event subscription plus one monitor subscription for
/// bookkeeping (state retention). Dropping the handle aborts the run.
#[derive(Debug)]
pub struct RunHandle {
    pub run_id: String,
    events: Option<broadcast::Receiver<AgentEvent>>,
    monitor: Option<broadcast::Receiver<AgentEvent>>,
    task: JoinHandle<()>,
}

impl RunHandle {
    /// Take the primary event subscription, created before the run started
    /// so it sees every event. Returns None on the second call.
    pub fn take_events(&mut self) -> Option<broadcast::Receiver<AgentEvent>> {
        self.events.take()
    }

    /// Take the monitor subscription, created before the run started so it
    /// sees every event. Returns None on the second call.
    pub fn take_monitor(&mut self) -> Option<broadcast::Receiver<AgentEvent>> {
        self.monitor.take()
    }

    pub fn abort(&self) {
        self.task.abort();
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a graph run on its own task.
/// The runner owns the event framing: it emits `RunStarted` before the
/// graph executes and exactly one terminal event after, so graphs only
/// report progress.
pub fn spawn_run(
    graph: Arc<dyn AgentGraph>,
    thread_id: String,
    messages: Vec<Message>,
    state: serde_json::Value,
) -> RunHandle {
    let run_id = Uuid::new_v4().to_string();
    let (tx, events) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let monitor = tx.subscribe();

    let rid = run_id.clone();
    let task = tokio::spawn(async move {
        let agent = graph.name().to_string();
        let ctx = RunContext::new(thread_id.clone(), rid.clone(), messages, state, tx);

        let started = AgentEvent::RunStarted {
            thread_id: thread_id.clone(),
            run_id: rid.clone(),
            agent: agent.clone(),
            timestamp: Utc::now(),
        };
        if ctx.emit(started).is_err() {
            return;
        }

        match graph.run(&ctx).await {
            Ok(message) => {
                info!("[{}] - [{}] run completed", rid, agent);
                let _ = ctx.emit(AgentEvent::RunFinished {
                    thread_id,
                    run_id: rid,
                    message,
                });
            }
            Err(AgentError::ChannelClosed) => {
                info!("[{}] - [{}] subscribers gone, run abandoned", rid, agent);
            }
            Err(e) => {
                error!("[{}] - [{}] run failed: {}", rid, agent, e);
                let _ = ctx.emit(AgentEvent::RunError {
                    run_id: rid,
                    message: e.to_string(),
                });
            }
        }
    });

    RunHandle {
        run_id,
        events: Some(events),
        monitor: Some(monitor),
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl AgentGraph for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "echoes the last user message"
        }

        async fn run(&self, ctx: &RunContext) -> Result<String, AgentError> {
            let text = ctx.latest_user_message().unwrap_or("nothing").to_string();
            ctx.text(text.clone())?;
            Ok(text)
        }
    }

    struct Failing;

    #[async_trait]
    impl AgentGraph for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        async fn run(&self, _ctx: &RunContext) -> Result<String, AgentError> {
            Err(AgentError::Execution("boom".into()))
        }
    }

    async fn collect(mut rx: broadcast::Receiver<AgentEvent>) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.recv().await {
            let terminal = event.is_terminal();
            events.push(event);
            if terminal {
                break;
            }
        }
        events
    }

    #[tokio::test]
    async fn run_is_framed_by_started_and_finished() {
        let mut handle = spawn_run(
            Arc::new(Echo),
            "t1".into(),
            vec![Message::user("hello")],
            serde_json::json!({}),
        );
        let events = collect(handle.take_events().unwrap()).await;

        assert!(matches!(events.first(), Some(AgentEvent::RunStarted { agent, .. }) if agent == "echo"));
        assert!(matches!(
            events.last(),
            Some(AgentEvent::RunFinished { message, .. }) if message == "hello"
        ));
    }

    #[tokio::test]
    async fn failing_graph_ends_with_run_error() {
        let mut handle = spawn_run(Arc::new(Failing), "t1".into(), vec![], serde_json::json!({}));
        let events = collect(handle.take_events().unwrap()).await;

        assert!(matches!(
            events.last(),
            Some(AgentEvent::RunError { message, .. }) if message.contains("boom")
        ));
    }

    #[tokio::test]
    async fn monitor_sees_the_same_stream() {
        let mut handle = spawn_run(
            Arc::new(Echo),
            "t1".into(),
            vec![Message::user("hi")],
            serde_json::json!({}),
        );
        let monitor = handle.take_monitor().unwrap();
        assert!(handle.take_monitor().is_none());

        let events = collect(monitor).await;
        assert!(events.iter().any(|e| e.is_terminal()));
    }
}

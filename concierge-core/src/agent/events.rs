use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Events broadcast by a running agent graph.
/// Every run emits `RunStarted` first and exactly one terminal event
/// (`RunFinished` or `RunError`) last.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    RunStarted {
        thread_id: String,
        run_id: String,
        agent: String,
        timestamp: DateTime<Utc>,
    },
    /// A chunk of streamed assistant text
    TextDelta { run_id: String, delta: String },
    /// Structured agent state published mid-run
    StateSnapshot {
        thread_id: String,
        run_id: String,
        state: serde_json::Value,
    },
    RunFinished {
        thread_id: String,
        run_id: String,
        message: String,
    },
    RunError { run_id: String, message: String },
}

impl AgentEvent {
    /// Whether this event ends the run stream
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AgentEvent::RunFinished { .. } | AgentEvent::RunError { .. }
        )
    }

    pub fn run_id(&self) -> &str {
        match self {
            AgentEvent::RunStarted { run_id, .. }
            | AgentEvent::TextDelta { run_id, .. }
            | AgentEvent::StateSnapshot { run_id, .. }
            | AgentEvent::RunFinished { run_id, .. }
            | AgentEvent::RunError { run_id, .. } => run_id,
        }
    }
}

use async_trait::async_trait;
use concierge_core::AgentEvent;
use serde::Serialize;

use crate::streaming::EventFormatter;

/// One frame of the remote-endpoint event stream
#[derive(Debug, Serialize)]
pub struct RuntimeFrame {
    pub thread_id: String,
    /// Monotonic per-stream counter, starts at 1
    pub sequence: u64,
    #[serde(flatten)]
    pub event: AgentEvent,
}

/// Formats runtime events into protocol frames
#[derive(Debug, Default)]
pub struct CopilotFormatter {
    sequence: u64,
}

impl CopilotFormatter {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventFormatter for CopilotFormatter {
    type Output = RuntimeFrame;

    async fn format_event(&mut self, event: AgentEvent, thread_id: &str) -> Option<Self::Output> {
        self.sequence += 1;
        Some(RuntimeFrame {
            thread_id: thread_id.to_string(),
            sequence: self.sequence,
            event,
        })
    }
}

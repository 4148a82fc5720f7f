use thiserror::Error;

/// Errors surfaced by the agent runtime
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("agent execution failed: {0}")]
    Execution(String),

    /// The event channel has no receivers left (client disconnected)
    #[error("event channel closed")]
    ChannelClosed,

    #[error("invalid agent state: {0}")]
    InvalidState(String),
}

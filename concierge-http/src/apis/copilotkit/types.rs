use concierge_core::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST /copilotkit/agents/execute`
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    /// Name of the registered agent to run
    pub name: String,
    /// Thread to run on; a fresh one is created when omitted
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Chat transcript handed to the agent
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Explicit state override; defaults to the thread's retained state
    #[serde(default)]
    pub state: Option<serde_json::Value>,
}

/// Body of `POST /copilotkit/agents/state`
#[derive(Debug, Clone, Deserialize)]
pub struct StateRequest {
    pub name: String,
    pub thread_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StateResponse {
    pub thread_id: String,
    pub state: serde_json::Value,
    /// False when the thread was never seen by this process
    pub exists: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub sdk_version: String,
    pub agents: Vec<AgentInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentInfo {
    pub name: String,
    pub description: String,
}

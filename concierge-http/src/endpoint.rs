use std::collections::HashSet;
use std::sync::Arc;

use concierge_core::AgentGraph;
use thiserror::Error;

/// Version string reported by the info operation
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("duplicate agent name: {0}")]
    DuplicateAgent(String),
}

/// One agent as exposed over the remote endpoint
#[derive(Clone)]
pub struct RegisteredAgent {
    pub name: String,
    pub description: String,
    pub graph: Arc<dyn AgentGraph>,
}

impl RegisteredAgent {
    /// Register a graph under its own name and description
    pub fn from_graph(graph: Arc<dyn AgentGraph>) -> Self {
        Self {
            name: graph.name().to_string(),
            description: graph.description().to_string(),
            graph,
        }
    }

    /// Register a graph under an explicit name and description
    pub fn named(
        name: impl Into<String>,
        description: impl Into<String>,
        graph: Arc<dyn AgentGraph>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            graph,
        }
    }
}

/// The registry behind the remote-agent endpoint: built once at startup,
/// read-only for the process lifetime. Registration order is the order
/// agents appear in the info listing.
pub struct RemoteEndpoint {
    agents: Vec<RegisteredAgent>,
}

impl std::fmt::Debug for RemoteEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEndpoint")
            .field(
                "agents",
                &self.agents.iter().map(|a| &a.name).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl RemoteEndpoint {
    pub fn new(agents: Vec<RegisteredAgent>) -> Result<Self, EndpointError> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.name.clone()) {
                return Err(EndpointError::DuplicateAgent(agent.name.clone()));
            }
        }
        Ok(Self { agents })
    }

    pub fn agent(&self, name: &str) -> Option<&RegisteredAgent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn agents(&self) -> &[RegisteredAgent] {
        &self.agents
    }
}

pub mod agent;
pub mod config;
pub mod error;

pub use agent::{
    spawn_run, AgentEvent, AgentGraph, Message, Role, RunContext, RunHandle,
};
pub use config::{ConfigError, ServerConfig};
pub use error::AgentError;

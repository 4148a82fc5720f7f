mod events;
mod graph;
mod message;
mod runner;

pub use events::AgentEvent;
pub use graph::{AgentGraph, RunContext};
pub use message::{Message, Role};
pub use runner::{spawn_run, RunHandle};

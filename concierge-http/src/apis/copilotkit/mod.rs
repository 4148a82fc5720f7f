pub mod formatter;
pub mod handler;
pub mod types;

pub use formatter::{CopilotFormatter, RuntimeFrame};
pub use handler::{handle_execute, handle_info, handle_state};
pub use types::{AgentInfo, ExecuteRequest, InfoResponse, StateRequest, StateResponse};

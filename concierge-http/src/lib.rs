pub mod apis;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod streaming;
pub mod threads;

pub use endpoint::{EndpointError, RegisteredAgent, RemoteEndpoint};
pub use error::{ApiJson, ErrorResponse};
pub use http::{build_router, start_server, ServerState, ROOT_MESSAGE};
pub use streaming::{run_to_sse_stream, EventFormatter};
pub use threads::{ThreadManager, ThreadManagerConfig};

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use concierge_core::ServerConfig;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::apis;
use crate::endpoint::RemoteEndpoint;
use crate::threads::{ThreadManager, ThreadManagerConfig};

/// Informational message served at the root path
pub const ROOT_MESSAGE: &str =
    "Concierge remote agent endpoint. POST /copilotkit/info to list agents, \
     POST /copilotkit/agents/execute to run one.\n";

/// Server state shared by all handlers
#[derive(Clone)]
pub struct ServerState {
    pub endpoint: Arc<RemoteEndpoint>,
    pub threads: Arc<ThreadManager>,
}

impl ServerState {
    pub fn new(endpoint: RemoteEndpoint, threads: ThreadManagerConfig) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            threads: Arc::new(ThreadManager::new(threads)),
        }
    }
}

/// Build the full application router: the remote-agent endpoint under
/// /copilotkit, the root informational endpoint, and a liveness probe,
/// with CORS and request tracing layered on top.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .route("/", post(handle_root))
        .route("/healthz", get(handle_health))
        .route("/copilotkit/info", post(apis::copilotkit::handle_info))
        .route(
            "/copilotkit/agents/execute",
            post(apis::copilotkit::handle_execute),
        )
        .route(
            "/copilotkit/agents/state",
            post(apis::copilotkit::handle_state),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Root endpoint: a static pointer at the protocol surface, with caching
/// and proxy buffering disabled
async fn handle_root() -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (header::CONNECTION, HeaderValue::from_static("keep-alive")),
            (
                HeaderName::from_static("x-accel-buffering"),
                HeaderValue::from_static("no"),
            ),
        ],
        ROOT_MESSAGE,
    )
}

async fn handle_health() -> StatusCode {
    StatusCode::OK
}

/// Start the HTTP server and block until shutdown.
/// Serves until ctrl-c, then drains gracefully.
pub async fn start_server(
    config: ServerConfig,
    endpoint: RemoteEndpoint,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let agent_names: Vec<&str> = endpoint.agents().iter().map(|a| a.name.as_str()).collect();
    info!("registered agents: {}", agent_names.join(", "));

    let state = ServerState::new(
        endpoint,
        ThreadManagerConfig {
            max_threads: config.max_threads,
        },
    );
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    info!("Server running on port {}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue},
    response::{sse::KeepAlive, IntoResponse, Json, Response, Sse},
};
use concierge_core::AgentError;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use super::formatter::CopilotFormatter;
use super::types::{AgentInfo, ExecuteRequest, InfoResponse, StateRequest, StateResponse};
use crate::endpoint::SDK_VERSION;
use crate::streaming::run_to_sse_stream;
use crate::{ApiJson, ErrorResponse, ServerState};

/// Describe the endpoint: version plus the registered agents
pub async fn handle_info(State(state): State<ServerState>) -> Json<InfoResponse> {
    let agents = state
        .endpoint
        .agents()
        .iter()
        .map(|a| AgentInfo {
            name: a.name.clone(),
            description: a.description.clone(),
        })
        .collect();

    Json(InfoResponse {
        sdk_version: SDK_VERSION.to_string(),
        agents,
    })
}

/// Run an agent on a thread - streaming response
pub async fn handle_execute(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<ExecuteRequest>,
) -> Result<Response, ErrorResponse> {
    let request_id = Uuid::new_v4();
    info!(
        "[{}] POST /copilotkit/agents/execute agent={} thread={}",
        request_id,
        payload.name,
        payload.thread_id.as_deref().unwrap_or("<new>"),
    );

    let agent = state
        .endpoint
        .agent(&payload.name)
        .ok_or_else(|| AgentError::UnknownAgent(payload.name.clone()))?;

    let (handle, thread_id) = state
        .threads
        .execute(
            &request_id.to_string(),
            agent.graph.clone(),
            payload.thread_id,
            payload.messages,
            payload.state,
        )
        .await?;

    let stream = run_to_sse_stream(handle, CopilotFormatter::new(), thread_id);

    let mut response = Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response();
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(
        HeaderName::from_static("x-accel-buffering"),
        HeaderValue::from_static("no"),
    );
    Ok(response)
}

/// Retained state of a thread
pub async fn handle_state(
    State(state): State<ServerState>,
    ApiJson(payload): ApiJson<StateRequest>,
) -> Result<Json<StateResponse>, ErrorResponse> {
    let request_id = Uuid::new_v4();
    info!(
        "[{}] POST /copilotkit/agents/state agent={} thread={}",
        request_id, payload.name, payload.thread_id,
    );

    if state.endpoint.agent(&payload.name).is_none() {
        return Err(AgentError::UnknownAgent(payload.name).into());
    }

    let response = match state.threads.state(&payload.thread_id).await {
        Some(retained) => StateResponse {
            thread_id: payload.thread_id,
            state: retained,
            exists: true,
        },
        // A thread ID is a client-chosen name, not a server resource
        None => StateResponse {
            thread_id: payload.thread_id,
            state: json!({}),
            exists: false,
        },
    };

    Ok(Json(response))
}

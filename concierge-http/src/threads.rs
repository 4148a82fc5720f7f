use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use concierge_core::{spawn_run, AgentError, AgentEvent, AgentGraph, Message, RunHandle};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

/// Configuration for the thread manager
#[derive(Clone, Debug)]
pub struct ThreadManagerConfig {
    /// Maximum number of concurrent threads (None = unlimited)
    pub max_threads: Option<usize>,
}

impl Default for ThreadManagerConfig {
    fn default() -> Self {
        Self {
            max_threads: Some(100),
        }
    }
}

/// Per-thread retained state: the latest snapshot a run published
pub struct ThreadState {
    pub state: serde_json::Value,
    pub last_run_id: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for ThreadState {
    fn default() -> Self {
        Self {
            state: serde_json::json!({}),
            last_run_id: None,
            updated_at: None,
        }
    }
}

/// Thread manager - tracks conversation threads by ID.
/// A thread is a client-chosen name carrying retained agent state between
/// runs; concurrent runs on the same thread serialize on the thread lock.
pub struct ThreadManager {
    threads: Arc<Mutex<HashMap<String, Arc<Mutex<ThreadState>>>>>,
    max_threads: Option<usize>,
}

impl ThreadManager {
    pub fn new(config: ThreadManagerConfig) -> Self {
        Self {
            threads: Arc::new(Mutex::new(HashMap::new())),
            max_threads: config.max_threads,
        }
    }

    async fn get_or_create(
        &self,
        http_request_id: &str,
        thread_id: &str,
    ) -> Result<Arc<Mutex<ThreadState>>, AgentError> {
        let mut threads = self.threads.lock().await;

        if let Some(thread) = threads.get(thread_id) {
            debug!("[{}] - [{}] using existing thread", http_request_id, thread_id);
            return Ok(thread.clone());
        }

        if let Some(max) = self.max_threads {
            if threads.len() >= max {
                return Err(AgentError::Execution(format!(
                    "maximum number of threads reached: {max}"
                )));
            }
        }

        info!("[{}] - [{}] creating new thread", http_request_id, thread_id);
        let thread = Arc::new(Mutex::new(ThreadState::default()));
        threads.insert(thread_id.to_string(), thread.clone());
        Ok(thread)
    }

    /// Run a graph on a thread.
    /// - If `thread_id` is provided, use or create that thread
    /// - If `thread_id` is None, generate a fresh thread ID
    ///
    /// The thread lock is held by a recorder task until the run emits its
    /// terminal event, so the retained state is settled by the time a
    /// follow-up request can observe the thread.
    pub async fn execute(
        &self,
        http_request_id: &str,
        graph: Arc<dyn AgentGraph>,
        thread_id: Option<String>,
        messages: Vec<Message>,
        state: Option<serde_json::Value>,
    ) -> Result<(RunHandle, String), AgentError> {
        let thread_id = thread_id.unwrap_or_else(|| Uuid::new_v4().to_string());
        let thread = self.get_or_create(http_request_id, &thread_id).await?;

        debug!("[{}] - [{}] acquiring thread lock", http_request_id, thread_id);
        let mut guard = thread.clone().lock_owned().await;
        debug!("[{}] - [{}] thread lock acquired", http_request_id, thread_id);

        let prior_state = state.unwrap_or_else(|| guard.state.clone());
        let mut handle = spawn_run(graph, thread_id.clone(), messages, prior_state);
        guard.last_run_id = Some(handle.run_id.clone());

        let monitor = handle
            .take_monitor()
            .ok_or_else(|| AgentError::InvalidState("run monitor already taken".to_string()))?;

        let tid = thread_id.clone();
        tokio::spawn(async move {
            record_run(tid, monitor, guard).await;
        });

        Ok((handle, thread_id))
    }

    /// Retained state for a thread, None if the thread was never seen.
    /// Waits for an in-flight run on the thread to settle.
    pub async fn state(&self, thread_id: &str) -> Option<serde_json::Value> {
        let thread = self.threads.lock().await.get(thread_id).cloned()?;
        let guard = thread.lock().await;
        Some(guard.state.clone())
    }

    /// Number of known threads
    pub async fn thread_count(&self) -> usize {
        self.threads.lock().await.len()
    }
}

/// Follow one run to its end, retaining published snapshots.
/// Owns the thread lock for the duration of the run.
async fn record_run(
    thread_id: String,
    mut monitor: broadcast::Receiver<AgentEvent>,
    mut guard: OwnedMutexGuard<ThreadState>,
) {
    loop {
        match monitor.recv().await {
            Ok(event) => {
                let terminal = event.is_terminal();
                if let AgentEvent::StateSnapshot { state, .. } = event {
                    guard.state = state;
                    guard.updated_at = Some(Utc::now());
                }
                if terminal {
                    debug!("[] - [{}] run settled, releasing thread lock", thread_id);
                    return;
                }
            }
            Err(RecvError::Closed) => {
                debug!("[] - [{}] run abandoned, releasing thread lock", thread_id);
                return;
            }
            Err(RecvError::Lagged(skipped)) => {
                debug!("[] - [{}] recorder lagged by {} events", thread_id, skipped);
            }
        }
    }
}

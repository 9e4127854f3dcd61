//! Test support utilities shared across unit and integration tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde_json::{Value, json};

use crate::error::VolumeError;
use crate::task::{TaskFuture, TaskResult, TaskWaiter};
use crate::transport::{ApiResponse, Transport, TransportFuture};

/// HTTP method recorded by [`ScriptedTransport`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

/// Records a single request made through [`ScriptedTransport`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HttpInvocation {
    /// Request method.
    pub method: HttpMethod,
    /// Request URL.
    pub url: String,
    /// Request body for `POST` requests.
    pub body: Option<Vec<u8>>,
}

impl HttpInvocation {
    /// Parses the request body as JSON, if there is one.
    #[must_use]
    pub fn body_json(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

#[derive(Debug, Default)]
struct TransportState {
    responses: VecDeque<Result<ApiResponse, VolumeError>>,
    fallback: Option<ApiResponse>,
    invocations: Vec<HttpInvocation>,
}

/// Scripted transport that returns pre-seeded responses in FIFO order.
///
/// Clones share state, so a clone handed to a [`crate::TaskPoller`] records
/// into the same invocation log. When the queue is empty the repeating
/// response is used, if set; otherwise the call fails with a transport
/// error.
#[derive(Clone, Debug, Default)]
pub struct ScriptedTransport {
    state: Arc<Mutex<TransportState>>,
}

impl ScriptedTransport {
    /// Creates a transport with no queued responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, TransportState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a raw response.
    pub fn push_response(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.lock()
            .responses
            .push_back(Ok(ApiResponse::new(status, body)));
    }

    /// Queues a JSON response.
    pub fn push_json(&self, status: u16, body: &Value) {
        self.push_response(status, body.to_string());
    }

    /// Queues a transport-level failure.
    pub fn push_error(&self, error: VolumeError) {
        self.lock().responses.push_back(Err(error));
    }

    /// Sets a JSON response returned whenever the queue is empty.
    pub fn repeat_json(&self, status: u16, body: &Value) {
        self.lock().fallback = Some(ApiResponse::new(status, body.to_string()));
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<HttpInvocation> {
        self.lock().invocations.clone()
    }

    /// Counts recorded requests with `method` whose URL ends with `suffix`.
    #[must_use]
    pub fn count(&self, method: HttpMethod, suffix: &str) -> usize {
        self.lock()
            .invocations
            .iter()
            .filter(|call| call.method == method && call.url.ends_with(suffix))
            .count()
    }

    fn respond(&self, method: HttpMethod, url: &str, body: Option<Vec<u8>>) -> TransportFuture<'_> {
        let mut state = self.lock();
        state.invocations.push(HttpInvocation {
            method,
            url: url.to_owned(),
            body,
        });
        let next = state
            .responses
            .pop_front()
            .or_else(|| state.fallback.clone().map(Ok))
            .unwrap_or_else(|| {
                Err(VolumeError::Transport {
                    message: format!("no scripted response available for {url}"),
                })
            });
        Box::pin(async move { next })
    }
}

impl Transport for ScriptedTransport {
    fn get<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        self.respond(HttpMethod::Get, url, None)
    }

    fn post<'a>(&'a self, url: &'a str, body: Vec<u8>) -> TransportFuture<'a> {
        self.respond(HttpMethod::Post, url, Some(body))
    }

    fn delete<'a>(&'a self, url: &'a str) -> TransportFuture<'a> {
        self.respond(HttpMethod::Delete, url, None)
    }
}

/// Records a single call made through [`ScriptedWaiter`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WaitCall {
    /// Status of the response handed to the waiter.
    pub response_status: u16,
    /// Timeout requested by the caller.
    pub timeout: Duration,
}

#[derive(Debug, Default)]
struct WaiterState {
    outcomes: VecDeque<Result<Vec<TaskResult>, VolumeError>>,
    calls: Vec<WaitCall>,
}

/// Scripted task waiter returning queued outcomes in FIFO order.
///
/// An empty queue yields an empty success, which suits deletions and
/// extensions whose task results are ignored.
#[derive(Clone, Debug, Default)]
pub struct ScriptedWaiter {
    state: Arc<Mutex<WaiterState>>,
}

impl ScriptedWaiter {
    /// Creates a waiter with no queued outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, WaiterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a successful wait returning a creation result for `volume_ids`.
    pub fn push_created_volumes(&self, volume_ids: &[&str]) {
        self.lock().outcomes.push_back(Ok(vec![TaskResult {
            task_id: String::from("task-create"),
            created_resources: json!({ "volumes": volume_ids }),
        }]));
    }

    /// Queues a successful wait without results.
    pub fn push_success(&self) {
        self.lock().outcomes.push_back(Ok(Vec::new()));
    }

    /// Queues a failed wait.
    pub fn push_error(&self, error: VolumeError) {
        self.lock().outcomes.push_back(Err(error));
    }

    /// Returns a snapshot of all waits recorded so far.
    #[must_use]
    pub fn calls(&self) -> Vec<WaitCall> {
        self.lock().calls.clone()
    }
}

impl TaskWaiter for ScriptedWaiter {
    fn wait_for_tasks<'a>(
        &'a self,
        response: &'a ApiResponse,
        timeout: Duration,
    ) -> TaskFuture<'a> {
        let mut state = self.lock();
        state.calls.push(WaitCall {
            response_status: response.status,
            timeout,
        });
        let next = state.outcomes.pop_front().unwrap_or_else(|| Ok(Vec::new()));
        Box::pin(async move { next })
    }
}

/// Produces the body returned by mutating calls: `{"tasks": [...]}`.
#[must_use]
pub fn task_list_json(task_ids: &[&str]) -> Value {
    json!({ "tasks": task_ids })
}

/// Produces a provider volume representation.
#[must_use]
pub fn volume_json(name: &str, size: u32, source: &str, volume_type: Option<&str>) -> Value {
    json!({
        "id": "vol-123",
        "name": name,
        "size": size,
        "source": source,
        "volume_type": volume_type,
        "project_id": 1,
        "region_id": 2,
        "status": "available"
    })
}

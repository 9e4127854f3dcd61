//! Task polling against the provider's task endpoint.

use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use crate::error::VolumeError;
use crate::transport::{ApiResponse, Transport, urls};

use super::{TaskFuture, TaskResult, TaskWaiter, task_ids};

const STATE_FINISHED: &str = "FINISHED";
const STATE_ERROR: &str = "ERROR";

#[derive(Deserialize)]
struct TaskStatus {
    state: String,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    created_resources: Option<Value>,
}

/// [`TaskWaiter`] that polls `GET <host>/v1/tasks/<id>` until each task
/// reaches `FINISHED` or `ERROR`.
///
/// A single deadline covers every task referenced by one response.
#[derive(Clone, Debug)]
pub struct TaskPoller<T> {
    transport: T,
    host: String,
    poll_interval: Duration,
}

impl<T: Transport> TaskPoller<T> {
    /// Creates a poller using `transport` to query task status.
    #[must_use]
    pub fn new(transport: T, host: impl Into<String>, poll_interval: Duration) -> Self {
        Self {
            transport,
            host: host.into(),
            poll_interval,
        }
    }

    async fn fetch_task(&self, task_id: &str) -> Result<TaskStatus, VolumeError> {
        let response = self
            .transport
            .get(&urls::task_url(&self.host, task_id))
            .await?;
        response.require_success(&format!("Get task {task_id} failed"))?;
        response.json(&format!("task {task_id}"))
    }

    async fn wait_for_task(
        &self,
        task_id: &str,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<TaskResult, VolumeError> {
        loop {
            let task = self.fetch_task(task_id).await?;
            match task.state.as_str() {
                STATE_FINISHED => {
                    debug!(task_id, "task finished");
                    return Ok(TaskResult {
                        task_id: task_id.to_owned(),
                        created_resources: task.created_resources.unwrap_or(Value::Null),
                    });
                }
                STATE_ERROR => {
                    return Err(VolumeError::TaskFailed {
                        task_id: task_id.to_owned(),
                        message: task
                            .error
                            .unwrap_or_else(|| String::from("task reported ERROR state")),
                    });
                }
                state => debug!(task_id, state, "task still running"),
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            sleep(self.poll_interval.min(remaining)).await;
        }

        Err(VolumeError::TaskTimeout {
            task_id: task_id.to_owned(),
            timeout_secs: timeout.as_secs(),
        })
    }
}

impl<T: Transport> TaskWaiter for TaskPoller<T> {
    fn wait_for_tasks<'a>(
        &'a self,
        response: &'a ApiResponse,
        timeout: Duration,
    ) -> TaskFuture<'a> {
        Box::pin(async move {
            let ids = task_ids(response)?;
            debug!(tasks = ?ids, timeout_secs = timeout.as_secs(), "waiting for tasks");
            let deadline = Instant::now().checked_add(timeout).ok_or_else(|| {
                VolumeError::Config(format!(
                    "task timeout of {}s is out of range",
                    timeout.as_secs()
                ))
            })?;
            let mut results = Vec::with_capacity(ids.len());
            for task_id in &ids {
                results.push(self.wait_for_task(task_id, deadline, timeout).await?);
            }
            Ok(results)
        })
    }
}

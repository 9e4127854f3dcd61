//! Provider task protocol.
//!
//! Mutating calls answer with `{"tasks": [<id>, ...]}`. A [`TaskWaiter`]
//! follows those tasks until they finish and hands back what each task
//! created.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::VolumeError;
use crate::transport::ApiResponse;

mod poller;

pub use poller::TaskPoller;

/// Future returned by [`TaskWaiter::wait_for_tasks`].
pub type TaskFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<TaskResult>, VolumeError>> + Send + 'a>>;

/// Waits for the tasks referenced by a provider response.
pub trait TaskWaiter: Send + Sync {
    /// Blocks until every task in `response` finishes, fails, or `timeout`
    /// elapses. Results are returned in task order.
    fn wait_for_tasks<'a>(&'a self, response: &'a ApiResponse, timeout: Duration)
    -> TaskFuture<'a>;
}

/// Resources created by one finished task.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskResult {
    /// Provider task identifier.
    pub task_id: String,
    /// The task's `created_resources` mapping.
    pub created_resources: Value,
}

impl TaskResult {
    /// Decodes the created resources into a typed structure.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Decode`] when the mapping does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, VolumeError> {
        T::deserialize(&self.created_resources).map_err(|err| VolumeError::Decode {
            context: format!("result of task {}", self.task_id),
            message: err.to_string(),
        })
    }
}

/// Volume IDs created by a volume creation task.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct CreatedVolumes {
    /// Newly created volume identifiers.
    #[serde(default)]
    pub volumes: Vec<String>,
}

/// Takes the first element of a task result list.
///
/// # Errors
///
/// Returns [`VolumeError::MissingTaskResult`] when `items` is empty.
pub fn first_or_error<T>(items: Vec<T>, context: &str) -> Result<T, VolumeError> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| VolumeError::MissingTaskResult {
            context: context.to_owned(),
        })
}

#[derive(Deserialize)]
struct TaskList {
    #[serde(default)]
    tasks: Vec<String>,
}

/// Extracts task identifiers from a mutating call's response.
///
/// # Errors
///
/// Returns [`VolumeError::Decode`] when the body is not a task list or the
/// list is empty.
pub fn task_ids(response: &ApiResponse) -> Result<Vec<String>, VolumeError> {
    let list: TaskList = response.json("task list")?;
    if list.tasks.is_empty() {
        return Err(VolumeError::Decode {
            context: String::from("task list"),
            message: String::from("response does not reference any task"),
        });
    }
    Ok(list.tasks)
}

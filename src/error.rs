//! Error types for the volume resource.

use crate::config::ConfigError;
use thiserror::Error;

/// Errors raised while managing a volume through the provider API.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VolumeError {
    /// Raised when provider configuration is incomplete.
    #[error("configuration error: {0}")]
    Config(String),
    /// Raised when the desired volume configuration is inconsistent.
    #[error("invalid volume configuration: {0}")]
    Validation(String),
    /// Raised when the project or region cannot be determined.
    #[error("cannot {context}: {message}")]
    ScopeResolution {
        /// Operation being attempted (for example `create a data volume`).
        context: String,
        /// Why resolution failed.
        message: String,
    },
    /// Raised when the HTTP request itself fails.
    #[error("transport error: {message}")]
    Transport {
        /// Message returned by the HTTP client.
        message: String,
    },
    /// Raised when the provider answers with a non-2xx status.
    #[error("{context}: status {status}: {message}")]
    ProviderStatus {
        /// Human-readable operation context (for example `Create volume data failed`).
        context: String,
        /// HTTP status code returned by the provider.
        status: u16,
        /// Response body returned by the provider.
        message: String,
    },
    /// Raised when the volume no longer exists remotely.
    #[error("volume {volume_id} not found")]
    NotFound {
        /// Volume identifier that was looked up.
        volume_id: String,
    },
    /// Raised when a provider task finishes in the error state.
    #[error("task {task_id} failed: {message}")]
    TaskFailed {
        /// Provider task identifier.
        task_id: String,
        /// Error reported by the task.
        message: String,
    },
    /// Raised when a provider task does not finish within the allotted time.
    #[error("timeout after {timeout_secs}s waiting for task {task_id}")]
    TaskTimeout {
        /// Provider task identifier.
        task_id: String,
        /// Timeout that elapsed, in seconds.
        timeout_secs: u64,
    },
    /// Raised when a response body does not match the expected shape.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Parser error message.
        message: String,
    },
    /// Raised when a request body cannot be serialised.
    #[error("failed to encode {context}: {message}")]
    Encode {
        /// What was being encoded.
        context: String,
        /// Serialiser error message.
        message: String,
    },
    /// Raised when a finished task carries no usable result.
    #[error("task result for {context} is empty")]
    MissingTaskResult {
        /// What the result was expected to contain.
        context: String,
    },
    /// Raised when an operation needs a volume ID the record does not carry.
    #[error("volume record has no identifier; create or import it first")]
    MissingIdentity,
    /// Raised when an import identifier cannot be parsed.
    #[error("invalid import identifier '{value}': {reason}")]
    InvalidImportId {
        /// Identifier passed by the caller.
        value: String,
        /// Why parsing failed.
        reason: String,
    },
}

impl VolumeError {
    /// Returns `true` when the error means the remote volume is gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<ConfigError> for VolumeError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value.to_string())
    }
}

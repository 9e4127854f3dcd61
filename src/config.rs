//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::resource::{OperationTimeouts, ResourceSettings, RetypeCompletion};

/// Default provider endpoint.
pub const DEFAULT_API_URL: &str = "https://api.gcore.com/cloud";

/// Upper bound for any task wait, in seconds (one day).
pub const MAX_TASK_TIMEOUT_SECS: u64 = 86_400;

/// Provider connection settings derived from environment variables,
/// configuration files, and CLI flags.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "BLOCKVOL",
    discovery(
        app_name = "blockvol",
        env_var = "BLOCKVOL_CONFIG_PATH",
        config_file_name = "blockvol.toml",
        dotfile_name = ".blockvol.toml",
        project_file_name = "blockvol.toml"
    )
)]
pub struct ProviderConfig {
    /// Base URL of the provider API, without the `/v1` suffix.
    #[ortho_config(default = DEFAULT_API_URL.to_owned())]
    pub api_url: String,
    /// Permanent API token sent as `Authorization: APIKey <token>`. Required.
    pub api_token: String,
    /// Per-request HTTP timeout in seconds.
    #[ortho_config(default = 30)]
    pub http_timeout_secs: u64,
    /// Delay between task status checks in seconds.
    #[ortho_config(default = 5)]
    pub poll_interval_secs: u64,
    /// Bound on waiting for a volume creation task, in seconds.
    #[ortho_config(default = 1200)]
    pub create_timeout_secs: u64,
    /// Bound on waiting for a volume extension task, in seconds.
    #[ortho_config(default = 1200)]
    pub extend_timeout_secs: u64,
    /// Bound on waiting for a volume deletion task, in seconds.
    #[ortho_config(default = 1200)]
    pub delete_timeout_secs: u64,
    /// Bound on waiting for a retype task, in seconds. Only used when
    /// `await_retype_task` is set.
    #[ortho_config(default = 1200)]
    pub retype_timeout_secs: u64,
    /// Wait for the task returned by a retype instead of trusting the status.
    #[ortho_config(default = false)]
    pub await_retype_task: bool,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }

    fn hint(&self) -> String {
        format!(
            "set {} or add {} to blockvol.toml",
            self.env_var, self.toml_key
        )
    }
}

impl ProviderConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: {}",
                metadata.description,
                metadata.hint()
            )));
        }
        Ok(())
    }

    fn require_positive(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidValue(format!(
                "{} must be greater than zero: {}",
                metadata.description,
                metadata.hint()
            )));
        }
        Ok(())
    }

    fn require_task_timeout(value: u64, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        Self::require_positive(value, metadata)?;
        if value > MAX_TASK_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue(format!(
                "{} must not exceed {MAX_TASK_TIMEOUT_SECS} seconds: {}",
                metadata.description,
                metadata.hint()
            )));
        }
        Ok(())
    }

    /// Loads configuration without attempting to parse CLI arguments. Values
    /// still merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("blockvol")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation. Error messages include guidance on how
    /// to provide missing values via environment variables or configuration
    /// files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::InvalidValue`] when a duration is zero or a task
    /// timeout exceeds [`MAX_TASK_TIMEOUT_SECS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("provider API URL", "BLOCKVOL_API_URL", "api_url"),
        )?;
        Self::require_field(
            &self.api_token,
            &FieldMetadata::new("provider API token", "BLOCKVOL_API_TOKEN", "api_token"),
        )?;
        Self::require_positive(
            self.http_timeout_secs,
            &FieldMetadata::new(
                "HTTP timeout",
                "BLOCKVOL_HTTP_TIMEOUT_SECS",
                "http_timeout_secs",
            ),
        )?;
        Self::require_positive(
            self.poll_interval_secs,
            &FieldMetadata::new(
                "task poll interval",
                "BLOCKVOL_POLL_INTERVAL_SECS",
                "poll_interval_secs",
            ),
        )?;
        Self::require_task_timeout(
            self.create_timeout_secs,
            &FieldMetadata::new(
                "create timeout",
                "BLOCKVOL_CREATE_TIMEOUT_SECS",
                "create_timeout_secs",
            ),
        )?;
        Self::require_task_timeout(
            self.extend_timeout_secs,
            &FieldMetadata::new(
                "extend timeout",
                "BLOCKVOL_EXTEND_TIMEOUT_SECS",
                "extend_timeout_secs",
            ),
        )?;
        Self::require_task_timeout(
            self.delete_timeout_secs,
            &FieldMetadata::new(
                "delete timeout",
                "BLOCKVOL_DELETE_TIMEOUT_SECS",
                "delete_timeout_secs",
            ),
        )?;
        Self::require_task_timeout(
            self.retype_timeout_secs,
            &FieldMetadata::new(
                "retype timeout",
                "BLOCKVOL_RETYPE_TIMEOUT_SECS",
                "retype_timeout_secs",
            ),
        )?;
        Ok(())
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Delay between task status checks.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Lifecycle settings derived from the configured timeouts.
    #[must_use]
    pub const fn settings(&self) -> ResourceSettings {
        ResourceSettings {
            timeouts: OperationTimeouts {
                create: Duration::from_secs(self.create_timeout_secs),
                extend: Duration::from_secs(self.extend_timeout_secs),
                delete: Duration::from_secs(self.delete_timeout_secs),
                retype: Duration::from_secs(self.retype_timeout_secs),
            },
            retype_completion: if self.await_retype_task {
                RetypeCompletion::AwaitTask
            } else {
                RetypeCompletion::StatusOnly
            },
        }
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configured value is out of range.
    #[error("invalid configuration value: {0}")]
    InvalidValue(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

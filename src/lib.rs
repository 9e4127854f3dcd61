//! Core library for the blockvol volume lifecycle tool.
//!
//! The crate manages provider block-storage volumes the way a declarative
//! infrastructure framework does: create, read, update, delete and import
//! callbacks operate on a persisted [`VolumeRecord`], translating each step
//! into versioned REST calls and waiting on the asynchronous tasks the
//! provider returns.

pub mod config;
pub mod error;
pub mod resource;
pub mod scope;
pub mod state_store;
pub mod task;
pub mod test_support;
pub mod transport;
pub mod volume;

pub use config::{ConfigError, ProviderConfig};
pub use error::VolumeError;
pub use resource::{
    OperationTimeouts, ResourceSettings, RetypeCompletion, UpdateOutcome, VolumeResource,
    fetch_volume,
};
pub use scope::{ScopeKind, ScopeRef, resolve_project, resolve_region, resolve_scope};
pub use state_store::{DEFAULT_STATE_FILE, StateStore, StateStoreError, read_volume_config};
pub use task::{CreatedVolumes, TaskPoller, TaskResult, TaskWaiter, first_or_error};
pub use transport::{ApiResponse, ReqwestTransport, Transport};
pub use volume::{
    ObservedVolume, Scope, VolumeConfig, VolumeIdentity, VolumeRecord, VolumeSource, VolumeSpec,
};

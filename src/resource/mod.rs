//! Volume lifecycle orchestration.
//!
//! [`VolumeResource`] implements the create, read, update, delete and import
//! callbacks a declarative framework invokes. Each call resolves the scope,
//! issues the provider request, waits for the resulting task and refreshes
//! the [`VolumeRecord`] it was handed. The record is only modified once the
//! step that produced the change has succeeded.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::ProviderConfig;
use crate::error::VolumeError;
use crate::scope::resolve_scope;
use crate::task::{CreatedVolumes, TaskPoller, TaskWaiter, first_or_error};
use crate::transport::{ReqwestTransport, Transport, urls};
use crate::volume::payload::create_payload;
use crate::volume::{VolumeIdentity, VolumeRecord, VolumeSpec};

mod actions;
mod fetch;

pub use fetch::fetch_volume;

const RESOURCE: &str = "volumes";

/// Default bound for volume creation, extension and deletion tasks.
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(1200);

/// Task wait bounds per operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct OperationTimeouts {
    /// Bound for the creation task.
    pub create: Duration,
    /// Bound for the extension task.
    pub extend: Duration,
    /// Bound for the deletion task.
    pub delete: Duration,
    /// Bound for the retype task when [`RetypeCompletion::AwaitTask`] is set.
    pub retype: Duration,
}

impl Default for OperationTimeouts {
    fn default() -> Self {
        Self {
            create: DEFAULT_OPERATION_TIMEOUT,
            extend: DEFAULT_OPERATION_TIMEOUT,
            delete: DEFAULT_OPERATION_TIMEOUT,
            retype: DEFAULT_OPERATION_TIMEOUT,
        }
    }
}

/// How a retype request is considered complete.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RetypeCompletion {
    /// A 2xx status from the retype endpoint is sufficient.
    #[default]
    StatusOnly,
    /// Wait for the task referenced by the retype response.
    AwaitTask,
}

/// Tunables for a [`VolumeResource`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ResourceSettings {
    /// Task wait bounds.
    pub timeouts: OperationTimeouts,
    /// Retype completion policy.
    pub retype_completion: RetypeCompletion,
}

/// Changes applied by [`VolumeResource::update`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct UpdateOutcome {
    /// Whether the volume was extended.
    pub extended: bool,
    /// Whether the volume was retyped.
    pub retyped: bool,
}

/// Lifecycle callbacks for a provider block-storage volume.
#[derive(Clone, Debug)]
pub struct VolumeResource<T, W> {
    transport: T,
    waiter: W,
    host: String,
    settings: ResourceSettings,
}

impl VolumeResource<ReqwestTransport, TaskPoller<ReqwestTransport>> {
    /// Builds a resource talking to the configured provider endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::Config`] when configuration validation fails
    /// and [`VolumeError::Transport`] when the HTTP client cannot be built.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, VolumeError> {
        let transport = ReqwestTransport::from_config(config)?;
        let waiter = TaskPoller::new(
            transport.clone(),
            config.api_url.clone(),
            config.poll_interval(),
        );
        Ok(Self::new(
            transport,
            waiter,
            config.api_url.clone(),
            config.settings(),
        ))
    }
}

impl<T: Transport, W: TaskWaiter> VolumeResource<T, W> {
    /// Creates a resource from its collaborators.
    #[must_use]
    pub fn new(
        transport: T,
        waiter: W,
        host: impl Into<String>,
        settings: ResourceSettings,
    ) -> Self {
        Self {
            transport,
            waiter,
            host: host.into(),
            settings,
        }
    }

    /// Settings in effect for this resource.
    #[must_use]
    pub const fn settings(&self) -> &ResourceSettings {
        &self.settings
    }

    /// Creates the volume described by `record.config` and records its ID.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError`] when validation, scope resolution, the create
    /// request, the creation task or the follow-up read fails. The record
    /// keeps no ID unless the creation task finished.
    pub async fn create(&self, record: &mut VolumeRecord) -> Result<(), VolumeError> {
        let spec = VolumeSpec::try_from(&record.config)?;
        info!(name = %spec.name, size = spec.size, source = %spec.source, "creating volume");
        let context = format!("create a {} volume", spec.name);
        let scope = resolve_scope(&self.transport, &self.host, &record.config, &context).await?;

        let body = create_payload(&spec)?;
        let url = urls::collection_url(&self.host, RESOURCE, scope);
        let response = self.transport.post(&url, body).await?;
        response.require_success(&format!("Create volume {} failed", spec.name))?;

        debug!("waiting for volume creation task");
        let results = self
            .waiter
            .wait_for_tasks(&response, self.settings.timeouts.create)
            .await?;
        let result = first_or_error(results, "volume creation")?;
        let created: CreatedVolumes = result.decode()?;
        let volume_id = first_or_error(created.volumes, "created volumes")?;

        info!(volume_id = %volume_id, "volume created");
        record.id = Some(volume_id);
        self.read(record).await
    }

    /// Refreshes the record from the provider.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::MissingIdentity`] when the record has no ID,
    /// [`VolumeError::NotFound`] when the volume is gone, or any scope,
    /// transport or decoding failure.
    pub async fn read(&self, record: &mut VolumeRecord) -> Result<(), VolumeError> {
        let volume_id = record.volume_id()?.to_owned();
        debug!(volume_id = %volume_id, "reading volume");
        let context = format!("get a volume {volume_id}");
        let scope = resolve_scope(&self.transport, &self.host, &record.config, &context).await?;

        let identity = VolumeIdentity::new(scope, volume_id);
        let observed = fetch_volume(&self.transport, &self.host, &identity).await?;
        record.apply_observed(observed);
        debug!(volume_id = %identity.volume_id, "finished reading volume");
        Ok(())
    }

    /// Reconciles size and type, then refreshes the record.
    ///
    /// Size changes extend the volume and type changes retype it; both may
    /// happen in one call. Name and source cannot change after creation and
    /// are not reconciled. An unset desired type leaves the current type
    /// alone.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError`] when validation, scope resolution, the fetch,
    /// either change or the follow-up read fails.
    pub async fn update(&self, record: &mut VolumeRecord) -> Result<UpdateOutcome, VolumeError> {
        let volume_id = record.volume_id()?.to_owned();
        let spec = VolumeSpec::try_from(&record.config)?;
        debug!(volume_id = %volume_id, "updating volume");
        let context = format!("update a volume {volume_id}");
        let scope = resolve_scope(&self.transport, &self.host, &record.config, &context).await?;

        let identity = VolumeIdentity::new(scope, volume_id);
        let current = fetch_volume(&self.transport, &self.host, &identity).await?;

        let mut outcome = UpdateOutcome::default();
        if current.size != spec.size {
            self.extend(&identity, spec.size).await?;
            outcome.extended = true;
        }
        if let Some(desired_type) = spec.type_name.as_deref()
            && current.volume_type.as_deref() != Some(desired_type)
        {
            self.retype(&identity, desired_type).await?;
            outcome.retyped = true;
        }

        debug!(?outcome, "finished updating volume");
        self.read(record).await?;
        Ok(outcome)
    }

    /// Deletes the volume and clears the record's identity.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError`] when scope resolution, the delete request or
    /// the deletion task fails; the record keeps its ID so the deletion can
    /// be retried.
    pub async fn delete(&self, record: &mut VolumeRecord) -> Result<(), VolumeError> {
        let volume_id = record.volume_id()?.to_owned();
        info!(volume_id = %volume_id, "deleting volume");
        let context = format!("delete the {volume_id} volume");
        let scope = resolve_scope(&self.transport, &self.host, &record.config, &context).await?;

        let url = urls::item_url(&self.host, RESOURCE, scope, &volume_id);
        let response = self.transport.delete(&url).await?;
        response.require_success(&format!("Delete volume {volume_id} failed"))?;

        self.waiter
            .wait_for_tasks(&response, self.settings.timeouts.delete)
            .await?;

        record.clear();
        info!(volume_id = %volume_id, "volume deleted");
        Ok(())
    }

    /// Imports an existing volume from `<project_id>:<region_id>:<volume_id>`.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::InvalidImportId`] for malformed identifiers and
    /// any error raised by the follow-up read.
    pub async fn import(&self, import_id: &str) -> Result<VolumeRecord, VolumeError> {
        let identity = import_id.parse::<VolumeIdentity>()?;
        self.import_identity(identity).await
    }

    /// Imports an existing volume from a parsed identity.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the follow-up read.
    pub async fn import_identity(
        &self,
        identity: VolumeIdentity,
    ) -> Result<VolumeRecord, VolumeError> {
        info!(identity = %identity, "importing volume");
        let mut record = VolumeRecord::default();
        record.config.project_id = Some(identity.scope.project_id);
        record.config.region_id = Some(identity.scope.region_id);
        record.id = Some(identity.volume_id);
        self.read(&mut record).await?;
        Ok(record)
    }
}

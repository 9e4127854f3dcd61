//! In-place volume changes issued by updates.

use tracing::{debug, info};

use crate::error::VolumeError;
use crate::task::TaskWaiter;
use crate::transport::{Transport, urls};
use crate::volume::VolumeIdentity;
use crate::volume::payload::{extend_payload, retype_payload};

use super::{RESOURCE, RetypeCompletion, VolumeResource};

impl<T: Transport, W: TaskWaiter> VolumeResource<T, W> {
    /// Grows the volume to `size` gigabytes and waits for the task.
    pub(super) async fn extend(
        &self,
        identity: &VolumeIdentity,
        size: u32,
    ) -> Result<(), VolumeError> {
        info!(volume_id = %identity.volume_id, size, "extending volume");
        let url = urls::action_url(
            &self.host,
            RESOURCE,
            identity.scope,
            &identity.volume_id,
            "extend",
        );
        let response = self.transport.post(&url, extend_payload(size)?).await?;
        response.require_success(&format!("Extend volume {} failed", identity.volume_id))?;
        self.waiter
            .wait_for_tasks(&response, self.settings.timeouts.extend)
            .await?;
        Ok(())
    }

    /// Changes the volume's storage class.
    pub(super) async fn retype(
        &self,
        identity: &VolumeIdentity,
        volume_type: &str,
    ) -> Result<(), VolumeError> {
        info!(volume_id = %identity.volume_id, volume_type, "retyping volume");
        let url = urls::action_url(
            &self.host,
            RESOURCE,
            identity.scope,
            &identity.volume_id,
            "retype",
        );
        let response = self
            .transport
            .post(&url, retype_payload(volume_type)?)
            .await?;
        response.require_success(&format!("Retype volume {} failed", identity.volume_id))?;
        match self.settings.retype_completion {
            RetypeCompletion::StatusOnly => {
                debug!("retype accepted; not waiting for a task");
            }
            RetypeCompletion::AwaitTask => {
                self.waiter
                    .wait_for_tasks(&response, self.settings.timeouts.retype)
                    .await?;
            }
        }
        Ok(())
    }
}

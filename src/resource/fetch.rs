//! Single-volume lookup.

use tracing::debug;

use crate::error::VolumeError;
use crate::transport::{Transport, urls};
use crate::volume::{ObservedVolume, VolumeIdentity};

use super::RESOURCE;

const NOT_FOUND: u16 = 404;

/// Fetches the remote state of one volume.
///
/// # Errors
///
/// Returns [`VolumeError::NotFound`] on a 404,
/// [`VolumeError::ProviderStatus`] for any other non-2xx status and
/// [`VolumeError::Decode`] when the body is not a volume.
pub async fn fetch_volume<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    identity: &VolumeIdentity,
) -> Result<ObservedVolume, VolumeError> {
    let url = urls::item_url(host, RESOURCE, identity.scope, &identity.volume_id);
    let response = transport.get(&url).await?;
    if response.status == NOT_FOUND {
        debug!(volume_id = %identity.volume_id, "volume reported missing");
        return Err(VolumeError::NotFound {
            volume_id: identity.volume_id.clone(),
        });
    }
    response.require_success(&format!("Can't find the volume {}", identity.volume_id))?;
    response.json("volume")
}

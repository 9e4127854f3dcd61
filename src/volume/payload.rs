//! Request bodies for volume creation and in-place changes.

use serde::Serialize;

use crate::error::VolumeError;

use super::VolumeSpec;

#[derive(Serialize)]
struct CreateVolumeBody<'a> {
    size: u32,
    source: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    type_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot_id: Option<&'a str>,
}

#[derive(Serialize)]
struct ExtendVolumeBody {
    size: u32,
}

#[derive(Serialize)]
struct RetypeVolumeBody<'a> {
    volume_type: &'a str,
}

fn encode<T: Serialize>(body: &T, context: &str) -> Result<Vec<u8>, VolumeError> {
    serde_json::to_vec(body).map_err(|err| VolumeError::Encode {
        context: context.to_owned(),
        message: err.to_string(),
    })
}

/// Serialises the creation body, omitting unset optional fields.
///
/// # Errors
///
/// Returns [`VolumeError::Encode`] when serialisation fails.
pub fn create_payload(spec: &VolumeSpec) -> Result<Vec<u8>, VolumeError> {
    let body = CreateVolumeBody {
        size: spec.size,
        source: spec.source.as_str(),
        name: &spec.name,
        type_name: spec.type_name.as_deref(),
        image_id: spec.source.image_id(),
        snapshot_id: spec.source.snapshot_id(),
    };
    encode(&body, "create volume request")
}

/// Serialises `{"size": <new_size>}`.
///
/// # Errors
///
/// Returns [`VolumeError::Encode`] when serialisation fails.
pub fn extend_payload(new_size: u32) -> Result<Vec<u8>, VolumeError> {
    encode(&ExtendVolumeBody { size: new_size }, "extend volume request")
}

/// Serialises `{"volume_type": <new_type>}`.
///
/// # Errors
///
/// Returns [`VolumeError::Encode`] when serialisation fails.
pub fn retype_payload(new_type: &str) -> Result<Vec<u8>, VolumeError> {
    encode(
        &RetypeVolumeBody {
            volume_type: new_type,
        },
        "retype volume request",
    )
}

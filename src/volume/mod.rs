//! Volume record model: desired configuration, observed state and identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::VolumeError;
use crate::scope::{ScopeKind, ScopeRef};

mod identity;
pub mod payload;

pub use identity::{Scope, VolumeIdentity};

const NEW_VOLUME: &str = "new-volume";
const IMAGE: &str = "image";
const SNAPSHOT: &str = "snapshot";

/// Volume configuration as the declarative framework persists it.
///
/// The shape is flat and permissive; [`VolumeSpec::try_from`] turns it into
/// a validated specification.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct VolumeConfig {
    /// Project identifier; conflicts with `project_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<u64>,
    /// Project name; conflicts with `project_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Region identifier; conflicts with `region_name`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_id: Option<u64>,
    /// Region display name; conflicts with `region_id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    /// Volume name.
    #[serde(default)]
    pub name: String,
    /// Volume origin: `new-volume`, `image` or `snapshot`.
    #[serde(default)]
    pub source: String,
    /// Size in gigabytes.
    #[serde(default)]
    pub size: u32,
    /// Storage performance class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    /// Image to build the volume from when `source` is `image`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<String>,
    /// Snapshot to restore from when `source` is `snapshot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot_id: Option<String>,
}

impl VolumeConfig {
    /// Returns the project selector.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ScopeResolution`] when both or neither of
    /// `project_id` and `project_name` are set.
    pub fn project_ref(&self, context: &str) -> Result<ScopeRef, VolumeError> {
        ScopeRef::from_fields(
            ScopeKind::Project,
            self.project_id,
            non_blank(self.project_name.as_deref()),
            context,
        )
    }

    /// Returns the region selector.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ScopeResolution`] when both or neither of
    /// `region_id` and `region_name` are set.
    pub fn region_ref(&self, context: &str) -> Result<ScopeRef, VolumeError> {
        ScopeRef::from_fields(
            ScopeKind::Region,
            self.region_id,
            non_blank(self.region_name.as_deref()),
            context,
        )
    }
}

/// Where a new volume's contents come from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VolumeSource {
    /// Empty volume.
    New,
    /// Volume built from an image.
    Image {
        /// Source image identifier.
        image_id: String,
    },
    /// Volume restored from a snapshot.
    Snapshot {
        /// Source snapshot identifier.
        snapshot_id: String,
    },
}

impl VolumeSource {
    /// Wire name used by the provider.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => NEW_VOLUME,
            Self::Image { .. } => IMAGE,
            Self::Snapshot { .. } => SNAPSHOT,
        }
    }

    /// Image identifier for image-backed volumes.
    #[must_use]
    pub fn image_id(&self) -> Option<&str> {
        match self {
            Self::Image { image_id } => Some(image_id),
            Self::New | Self::Snapshot { .. } => None,
        }
    }

    /// Snapshot identifier for snapshot-backed volumes.
    #[must_use]
    pub fn snapshot_id(&self) -> Option<&str> {
        match self {
            Self::Snapshot { snapshot_id } => Some(snapshot_id),
            Self::New | Self::Image { .. } => None,
        }
    }

    fn from_fields(
        source: &str,
        image_id: Option<&str>,
        snapshot_id: Option<&str>,
    ) -> Result<Self, VolumeError> {
        let invalid = |message: &str| -> Result<Self, VolumeError> {
            Err(VolumeError::Validation(message.to_owned()))
        };
        match (source.trim(), image_id, snapshot_id) {
            (NEW_VOLUME, None, None) => Ok(Self::New),
            (NEW_VOLUME, _, _) => {
                invalid("source new-volume does not accept image_id or snapshot_id")
            }
            (IMAGE, Some(id), None) => Ok(Self::Image {
                image_id: id.to_owned(),
            }),
            (IMAGE, None, _) => invalid("source image requires image_id"),
            (IMAGE, Some(_), Some(_)) => invalid("source image does not accept snapshot_id"),
            (SNAPSHOT, None, Some(id)) => Ok(Self::Snapshot {
                snapshot_id: id.to_owned(),
            }),
            (SNAPSHOT, _, None) => invalid("source snapshot requires snapshot_id"),
            (SNAPSHOT, Some(_), Some(_)) => invalid("source snapshot does not accept image_id"),
            (other, _, _) => Err(VolumeError::Validation(format!(
                "unknown source '{other}' (expected {NEW_VOLUME}, {IMAGE} or {SNAPSHOT})"
            ))),
        }
    }
}

impl fmt::Display for VolumeSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated desired state of a volume.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VolumeSpec {
    /// Volume name.
    pub name: String,
    /// Size in gigabytes, always positive.
    pub size: u32,
    /// Volume origin.
    pub source: VolumeSource,
    /// Storage performance class; `None` leaves the provider default.
    pub type_name: Option<String>,
}

impl TryFrom<&VolumeConfig> for VolumeSpec {
    type Error = VolumeError;

    fn try_from(config: &VolumeConfig) -> Result<Self, Self::Error> {
        let name = config.name.trim();
        if name.is_empty() {
            return Err(VolumeError::Validation(String::from(
                "name must not be empty",
            )));
        }
        if config.size == 0 {
            return Err(VolumeError::Validation(String::from(
                "size must be greater than zero",
            )));
        }
        let source = VolumeSource::from_fields(
            &config.source,
            non_blank(config.image_id.as_deref()),
            non_blank(config.snapshot_id.as_deref()),
        )?;
        Ok(Self {
            name: name.to_owned(),
            size: config.size,
            source,
            type_name: non_blank(config.type_name.as_deref()).map(str::to_owned),
        })
    }
}

/// Volume as reported by the provider.
///
/// Image and snapshot identifiers are not echoed back, so they are absent.
#[derive(Clone, Debug, Deserialize, Serialize, Eq, PartialEq)]
pub struct ObservedVolume {
    /// Size in gigabytes.
    pub size: u32,
    /// Region the volume lives in.
    pub region_id: u64,
    /// Project owning the volume.
    pub project_id: u64,
    /// Storage performance class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
    /// Volume origin as reported by the provider.
    #[serde(default)]
    pub source: String,
    /// Volume name.
    pub name: String,
}

/// Resource handle persisted by the declarative framework between calls.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
pub struct VolumeRecord {
    /// Provider-assigned volume identifier, set once creation succeeds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Desired configuration, refreshed from observed state on read.
    #[serde(default)]
    pub config: VolumeConfig,
    /// Last observed remote state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed: Option<ObservedVolume>,
}

impl VolumeRecord {
    /// Creates a record for a volume that does not exist yet.
    #[must_use]
    pub const fn new(config: VolumeConfig) -> Self {
        Self {
            id: None,
            config,
            observed: None,
        }
    }

    /// Returns the stored volume identifier.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::MissingIdentity`] when the record has no ID.
    pub fn volume_id(&self) -> Result<&str, VolumeError> {
        non_blank(self.id.as_deref()).ok_or(VolumeError::MissingIdentity)
    }

    /// Copies observed fields into the record.
    ///
    /// Project and region IDs are only written back when the configuration
    /// does not select them by name, so the selectors stay mutually
    /// exclusive.
    pub fn apply_observed(&mut self, observed: ObservedVolume) {
        self.config.size = observed.size;
        self.config.name.clone_from(&observed.name);
        self.config.source.clone_from(&observed.source);
        self.config.type_name.clone_from(&observed.volume_type);
        if non_blank(self.config.project_name.as_deref()).is_none() {
            self.config.project_id = Some(observed.project_id);
        }
        if non_blank(self.config.region_name.as_deref()).is_none() {
            self.config.region_id = Some(observed.region_id);
        }
        self.observed = Some(observed);
    }

    /// Clears identity and observed state after deletion.
    pub fn clear(&mut self) {
        self.id = None;
        self.observed = None;
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

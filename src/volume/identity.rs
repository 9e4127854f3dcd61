//! Scope and identity of a provider volume.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VolumeError;

/// Tenancy context of a resource: project and region.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, Eq, PartialEq, Hash)]
pub struct Scope {
    /// Project identifier.
    pub project_id: u64,
    /// Region identifier.
    pub region_id: u64,
}

impl Scope {
    /// Creates a scope.
    #[must_use]
    pub const fn new(project_id: u64, region_id: u64) -> Self {
        Self {
            project_id,
            region_id,
        }
    }
}

/// Composite key of a volume.
///
/// Renders as the import identifier `<project_id>:<region_id>:<volume_id>`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VolumeIdentity {
    /// Project and region the volume lives in.
    pub scope: Scope,
    /// Provider-assigned volume identifier.
    pub volume_id: String,
}

impl VolumeIdentity {
    /// Creates an identity, trimming the volume ID.
    #[must_use]
    pub fn new(scope: Scope, volume_id: impl Into<String>) -> Self {
        Self {
            scope,
            volume_id: volume_id.into().trim().to_owned(),
        }
    }
}

impl fmt::Display for VolumeIdentity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "{}:{}:{}",
            self.scope.project_id, self.scope.region_id, self.volume_id
        )
    }
}

impl FromStr for VolumeIdentity {
    type Err = VolumeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| VolumeError::InvalidImportId {
            value: value.to_owned(),
            reason: reason.to_owned(),
        };
        let parts = value.trim().split(':').collect::<Vec<_>>();
        let [project, region, volume] = parts.as_slice() else {
            return Err(invalid(
                "expected <project_id>:<region_id>:<volume_id>",
            ));
        };
        let project_id = project
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid("project_id must be an unsigned integer"))?;
        let region_id = region
            .trim()
            .parse::<u64>()
            .map_err(|_| invalid("region_id must be an unsigned integer"))?;
        if volume.trim().is_empty() {
            return Err(invalid("volume_id must not be empty"));
        }
        Ok(Self::new(Scope::new(project_id, region_id), *volume))
    }
}

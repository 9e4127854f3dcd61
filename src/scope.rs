//! Project and region resolution.
//!
//! Configuration selects the project and the region either by numeric ID or
//! by name. Names are resolved against the provider's listing endpoints on
//! every call; nothing is cached.

use serde::Deserialize;
use tracing::debug;

use crate::error::VolumeError;
use crate::transport::{Transport, urls};
use crate::volume::{Scope, VolumeConfig};

/// Which half of the scope a selector refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScopeKind {
    /// Tenancy project.
    Project,
    /// Deployment region.
    Region,
}

impl ScopeKind {
    const fn id_field(self) -> &'static str {
        match self {
            Self::Project => "project_id",
            Self::Region => "region_id",
        }
    }

    const fn name_field(self) -> &'static str {
        match self {
            Self::Project => "project_name",
            Self::Region => "region_name",
        }
    }

    const fn listing(self) -> &'static str {
        match self {
            Self::Project => "projects",
            Self::Region => "regions",
        }
    }
}

/// Project or region selector taken from configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ScopeRef {
    /// Numeric identifier, used as-is.
    Id(u64),
    /// Name looked up through the provider listing.
    Name(String),
}

impl ScopeRef {
    /// Builds a selector from mutually exclusive configuration fields.
    ///
    /// # Errors
    ///
    /// Returns [`VolumeError::ScopeResolution`] when both or neither field is
    /// set.
    pub fn from_fields(
        kind: ScopeKind,
        id: Option<u64>,
        name: Option<&str>,
        context: &str,
    ) -> Result<Self, VolumeError> {
        match (id, name) {
            (Some(value), None) => Ok(Self::Id(value)),
            (None, Some(value)) => Ok(Self::Name(value.to_owned())),
            (Some(_), Some(_)) => Err(VolumeError::ScopeResolution {
                context: context.to_owned(),
                message: format!(
                    "{} conflicts with {}",
                    kind.id_field(),
                    kind.name_field()
                ),
            }),
            (None, None) => Err(VolumeError::ScopeResolution {
                context: context.to_owned(),
                message: format!(
                    "either {} or {} must be set",
                    kind.id_field(),
                    kind.name_field()
                ),
            }),
        }
    }
}

#[derive(Deserialize)]
struct Listing {
    #[serde(default)]
    results: Vec<ListedEntry>,
}

#[derive(Deserialize)]
struct ListedEntry {
    id: u64,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl ListedEntry {
    fn matches(&self, kind: ScopeKind, wanted: &str) -> bool {
        let label = match kind {
            ScopeKind::Project => self.name.as_deref(),
            ScopeKind::Region => self.display_name.as_deref(),
        };
        label.is_some_and(|value| value == wanted)
    }
}

async fn resolve<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    kind: ScopeKind,
    selector: &ScopeRef,
    context: &str,
) -> Result<u64, VolumeError> {
    let wanted = match selector {
        ScopeRef::Id(id) => return Ok(*id),
        ScopeRef::Name(name) => name.as_str(),
    };

    debug!(listing = kind.listing(), name = wanted, "resolving scope by name");
    let response = transport.get(&urls::listing_url(host, kind.listing())).await?;
    response.require_success(&format!("List {} failed", kind.listing()))?;
    let listing: Listing = response.json(kind.listing())?;

    listing
        .results
        .iter()
        .find(|entry| entry.matches(kind, wanted))
        .map(|entry| entry.id)
        .ok_or_else(|| VolumeError::ScopeResolution {
            context: context.to_owned(),
            message: format!("{} '{wanted}' not found", kind.name_field()),
        })
}

/// Resolves a project selector to its numeric ID.
///
/// # Errors
///
/// Returns [`VolumeError::ScopeResolution`] when no project has the given
/// name, or the transport/decoding error raised by the listing request.
pub async fn resolve_project<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    selector: &ScopeRef,
    context: &str,
) -> Result<u64, VolumeError> {
    resolve(transport, host, ScopeKind::Project, selector, context).await
}

/// Resolves a region selector to its numeric ID.
///
/// # Errors
///
/// Returns [`VolumeError::ScopeResolution`] when no region has the given
/// display name, or the transport/decoding error raised by the listing
/// request.
pub async fn resolve_region<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    selector: &ScopeRef,
    context: &str,
) -> Result<u64, VolumeError> {
    resolve(transport, host, ScopeKind::Region, selector, context).await
}

/// Resolves both halves of a volume's scope from its configuration.
///
/// # Errors
///
/// Returns the first resolution failure.
pub async fn resolve_scope<T: Transport + ?Sized>(
    transport: &T,
    host: &str,
    config: &VolumeConfig,
    context: &str,
) -> Result<Scope, VolumeError> {
    let project_ref = config.project_ref(context)?;
    let region_ref = config.region_ref(context)?;
    let project_id = resolve_project(transport, host, &project_ref, context).await?;
    let region_id = resolve_region(transport, host, &region_ref, context).await?;
    Ok(Scope::new(project_id, region_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HttpMethod, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn id_selector_skips_the_listing() {
        let transport = ScriptedTransport::new();
        let id = resolve_project(&transport, "http://host", &ScopeRef::Id(5), "read")
            .await
            .expect("id resolves directly");
        assert_eq!(id, 5);
        assert!(transport.invocations().is_empty());
    }

    #[tokio::test]
    async fn project_name_matches_listing_entry() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            &json!({"count": 2, "results": [
                {"id": 3, "name": "staging"},
                {"id": 4, "name": "default"}
            ]}),
        );
        let id = resolve_project(
            &transport,
            "http://host",
            &ScopeRef::Name(String::from("default")),
            "read",
        )
        .await
        .expect("project resolves");
        assert_eq!(id, 4);
        let calls = transport.invocations();
        assert_eq!(calls.len(), 1);
        assert!(calls.iter().all(|call| call.method == HttpMethod::Get
            && call.url == "http://host/v1/projects"));
    }

    #[tokio::test]
    async fn region_name_matches_display_name() {
        let transport = ScriptedTransport::new();
        transport.push_json(
            200,
            &json!({"results": [{"id": 76, "display_name": "Luxembourg-2"}]}),
        );
        let id = resolve_region(
            &transport,
            "http://host",
            &ScopeRef::Name(String::from("Luxembourg-2")),
            "read",
        )
        .await
        .expect("region resolves");
        assert_eq!(id, 76);
    }

    #[tokio::test]
    async fn unknown_name_is_a_scope_error() {
        let transport = ScriptedTransport::new();
        transport.push_json(200, &json!({"results": []}));
        let err = resolve_region(
            &transport,
            "http://host",
            &ScopeRef::Name(String::from("Atlantis")),
            "create a data volume",
        )
        .await
        .expect_err("no such region");
        assert_eq!(
            err.to_string(),
            "cannot create a data volume: region_name 'Atlantis' not found"
        );
    }
}

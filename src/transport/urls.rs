//! URL builders for the provider's versioned resource endpoints.

use crate::volume::Scope;

fn base(host: &str) -> &str {
    host.trim_end_matches('/')
}

/// Collection endpoint, for example `<host>/v1/volumes/<project>/<region>`.
#[must_use]
pub fn collection_url(host: &str, resource: &str, scope: Scope) -> String {
    format!(
        "{}/v1/{resource}/{}/{}",
        base(host),
        scope.project_id,
        scope.region_id
    )
}

/// Item endpoint for a single resource inside a scope.
#[must_use]
pub fn item_url(host: &str, resource: &str, scope: Scope, id: &str) -> String {
    format!("{}/{id}", collection_url(host, resource, scope))
}

/// Action endpoint below an item, for example `.../<id>/extend`.
#[must_use]
pub fn action_url(host: &str, resource: &str, scope: Scope, id: &str, action: &str) -> String {
    format!("{}/{action}", item_url(host, resource, scope, id))
}

/// Unscoped listing endpoint such as `<host>/v1/projects`.
#[must_use]
pub fn listing_url(host: &str, resource: &str) -> String {
    format!("{}/v1/{resource}", base(host))
}

/// Task status endpoint.
#[must_use]
pub fn task_url(host: &str, task_id: &str) -> String {
    format!("{}/v1/tasks/{task_id}", base(host))
}

//! End-to-end lifecycle tests against a mock provider API.

#[path = "common/scope_constants.rs"]
mod scope_constants;
#[path = "common/test_constants.rs"]
mod test_constants;

use std::time::Duration;

use blockvol::{
    ReqwestTransport, ResourceSettings, TaskPoller, VolumeConfig, VolumeError, VolumeRecord,
    VolumeResource,
};
use httpmock::prelude::*;
use rstest::*;
use serde_json::json;

use scope_constants::{PROJECT_ID, REGION_ID};
use test_constants::API_TOKEN;

type LiveResource = VolumeResource<ReqwestTransport, TaskPoller<ReqwestTransport>>;

const AUTHORIZATION: &str = "APIKey test-token";

fn resource(server: &MockServer) -> LiveResource {
    let transport = ReqwestTransport::new(API_TOKEN, Duration::from_secs(5))
        .unwrap_or_else(|err| panic!("transport: {err}"));
    let waiter = TaskPoller::new(
        transport.clone(),
        server.base_url(),
        Duration::from_millis(10),
    );
    VolumeResource::new(
        transport,
        waiter,
        server.base_url(),
        ResourceSettings::default(),
    )
}

fn volumes_path() -> String {
    format!("/v1/volumes/{PROJECT_ID}/{REGION_ID}")
}

#[fixture]
fn config() -> VolumeConfig {
    VolumeConfig {
        project_id: Some(PROJECT_ID),
        region_id: Some(REGION_ID),
        name: String::from("data"),
        source: String::from("new-volume"),
        size: 10,
        ..VolumeConfig::default()
    }
}

fn volume_body(size: u32) -> serde_json::Value {
    json!({
        "id": "vol-1",
        "name": "data",
        "size": size,
        "source": "new-volume",
        "volume_type": "standard",
        "project_id": PROJECT_ID,
        "region_id": REGION_ID,
        "status": "available"
    })
}

#[rstest]
#[tokio::test]
async fn create_polls_task_and_reads_volume(config: VolumeConfig) {
    let server = MockServer::start_async().await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(volumes_path())
                .header("authorization", AUTHORIZATION)
                .json_body(json!({"size": 10, "source": "new-volume", "name": "data"}));
            then.status(200).json_body(json!({"tasks": ["t-create"]}));
        })
        .await;
    let task = server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/t-create");
            then.status(200).json_body(json!({
                "id": "t-create",
                "state": "FINISHED",
                "created_resources": {"volumes": ["vol-1"]}
            }));
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/vol-1", volumes_path()));
            then.status(200).json_body(volume_body(10));
        })
        .await;

    let mut record = VolumeRecord::new(config);
    resource(&server)
        .create(&mut record)
        .await
        .unwrap_or_else(|err| panic!("create: {err}"));

    create.assert_async().await;
    task.assert_async().await;
    read.assert_async().await;
    assert_eq!(record.id.as_deref(), Some("vol-1"));
    assert_eq!(record.config.type_name.as_deref(), Some("standard"));
}

#[rstest]
#[tokio::test]
async fn failed_delete_task_keeps_identity(config: VolumeConfig) {
    let server = MockServer::start_async().await;
    let delete = server
        .mock_async(|when, then| {
            when.method(DELETE).path(format!("{}/vol-1", volumes_path()));
            then.status(200).json_body(json!({"tasks": ["t-delete"]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/t-delete");
            then.status(200)
                .json_body(json!({"state": "ERROR", "error": "volume is attached"}));
        })
        .await;

    let mut record = VolumeRecord {
        id: Some(String::from("vol-1")),
        config,
        observed: None,
    };
    let err = resource(&server)
        .delete(&mut record)
        .await
        .expect_err("task reported an error");

    delete.assert_async().await;
    assert_eq!(
        err,
        VolumeError::TaskFailed {
            task_id: String::from("t-delete"),
            message: String::from("volume is attached"),
        }
    );
    assert_eq!(record.id.as_deref(), Some("vol-1"));
}

#[rstest]
#[tokio::test]
async fn update_extends_through_action_endpoint(mut config: VolumeConfig) {
    config.size = 20;
    let server = MockServer::start_async().await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/vol-1", volumes_path()));
            then.status(200).json_body(volume_body(10));
        })
        .await;
    let extend = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(format!("{}/vol-1/extend", volumes_path()))
                .json_body(json!({"size": 20}));
            then.status(200).json_body(json!({"tasks": ["t-extend"]}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v1/tasks/t-extend");
            then.status(200).json_body(json!({"state": "FINISHED"}));
        })
        .await;

    let mut record = VolumeRecord {
        id: Some(String::from("vol-1")),
        config,
        observed: None,
    };
    let outcome = resource(&server)
        .update(&mut record)
        .await
        .unwrap_or_else(|err| panic!("update: {err}"));

    assert!(outcome.extended);
    assert!(!outcome.retyped);
    extend.assert_async().await;
    assert_eq!(read.hits_async().await, 2);
}

#[rstest]
#[tokio::test]
async fn missing_volume_is_not_found(config: VolumeConfig) {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("{}/vol-gone", volumes_path()));
            then.status(404).body("volume not found");
        })
        .await;

    let mut record = VolumeRecord {
        id: Some(String::from("vol-gone")),
        config,
        observed: None,
    };
    let err = resource(&server)
        .read(&mut record)
        .await
        .expect_err("volume is gone");

    assert!(err.is_not_found(), "unexpected: {err}");
}

#[tokio::test]
async fn import_reads_volume_in_given_scope() {
    let server = MockServer::start_async().await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("{}/vol-1", volumes_path()))
                .header("authorization", AUTHORIZATION);
            then.status(200).json_body(volume_body(10));
        })
        .await;

    let record = resource(&server)
        .import(&format!("{PROJECT_ID}:{REGION_ID}:vol-1"))
        .await
        .unwrap_or_else(|err| panic!("import: {err}"));

    read.assert_async().await;
    assert_eq!(record.id.as_deref(), Some("vol-1"));
    assert_eq!(record.config.size, 10);
    assert_eq!(record.config.project_id, Some(PROJECT_ID));
}

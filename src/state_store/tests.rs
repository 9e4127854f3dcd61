//! Tests for state file persistence.

use super::*;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct StateFixture {
    _tmp: TempDir,
    root: Utf8PathBuf,
    store: StateStore,
}

#[fixture]
fn state_fixture() -> StateFixture {
    let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
        .unwrap_or_else(|err| panic!("temp path should be utf8: {}", err.display()));
    let store = StateStore::new(root.join("state").join(DEFAULT_STATE_FILE));
    StateFixture {
        _tmp: tmp,
        root,
        store,
    }
}

fn sample_record() -> VolumeRecord {
    VolumeRecord {
        id: Some(String::from("vol-123")),
        config: VolumeConfig {
            project_id: Some(1),
            region_id: Some(2),
            name: String::from("data"),
            source: String::from("new-volume"),
            size: 10,
            ..VolumeConfig::default()
        },
        observed: None,
    }
}

#[rstest]
fn load_without_state_file_returns_none(state_fixture: StateFixture) {
    let loaded = state_fixture
        .store
        .load()
        .unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(loaded, None);
}

#[rstest]
fn save_creates_parent_directories_and_loads_back(state_fixture: StateFixture) {
    let record = sample_record();
    state_fixture
        .store
        .save(&record)
        .unwrap_or_else(|err| panic!("save: {err}"));

    let loaded = state_fixture
        .store
        .load()
        .unwrap_or_else(|err| panic!("load: {err}"));
    assert_eq!(loaded, Some(record));
}

#[rstest]
fn remove_reports_whether_a_file_existed(state_fixture: StateFixture) {
    let StateFixture { store, .. } = state_fixture;
    store
        .save(&sample_record())
        .unwrap_or_else(|err| panic!("save: {err}"));

    assert_eq!(store.remove(), Ok(true));
    assert_eq!(store.remove(), Ok(false));
    assert_eq!(store.load(), Ok(None));
}

#[rstest]
fn corrupt_state_is_a_parse_error(state_fixture: StateFixture) {
    let dir = state_fixture.root.join("state");
    Dir::create_ambient_dir_all(&dir, ambient_authority())
        .unwrap_or_else(|err| panic!("create dir: {err}"));
    open_dir(&dir)
        .and_then(|handle| {
            handle
                .write(DEFAULT_STATE_FILE, "{not json")
                .map_err(|err| StateStoreError::Io {
                    path: dir.clone(),
                    message: err.to_string(),
                })
        })
        .unwrap_or_else(|err| panic!("seed state: {err}"));

    let Err(err) = state_fixture.store.load() else {
        panic!("corrupt state should fail");
    };
    assert!(matches!(err, StateStoreError::Parse { .. }), "unexpected: {err}");
}

#[rstest]
fn read_volume_config_parses_desired_state(state_fixture: StateFixture) {
    let path = state_fixture.root.join("volume.json");
    let dir = open_dir(&state_fixture.root).unwrap_or_else(|err| panic!("open root: {err}"));
    dir.write(
        "volume.json",
        r#"{"region_name": "Luxembourg-2", "project_id": 1, "name": "data",
            "source": "image", "image_id": "img-1", "size": 20}"#,
    )
    .unwrap_or_else(|err| panic!("write config: {err}"));

    let config = read_volume_config(&path).unwrap_or_else(|err| panic!("read config: {err}"));
    assert_eq!(config.region_name.as_deref(), Some("Luxembourg-2"));
    assert_eq!(config.image_id.as_deref(), Some("img-1"));
    assert_eq!(config.size, 20);
}

#[test]
fn bare_file_names_resolve_against_the_current_directory() {
    let (parent, file_name) =
        split_path(Utf8Path::new(DEFAULT_STATE_FILE)).unwrap_or_else(|err| panic!("split: {err}"));
    assert_eq!(parent, Utf8Path::new("."));
    assert_eq!(file_name, DEFAULT_STATE_FILE);
}

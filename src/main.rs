//! Binary entry point for the blockvol CLI.

use std::io::{self, Write};
use std::process;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use blockvol::{
    ProviderConfig, ReqwestTransport, StateStore, StateStoreError, TaskPoller, VolumeError,
    VolumeIdentity, VolumeRecord, VolumeResource, read_volume_config,
};

mod cli;

use cli::{ApplyCommand, Cli, ImportCommand, StateArgs};

type LiveResource = VolumeResource<ReqwestTransport, TaskPoller<ReqwestTransport>>;

const DEFAULT_LOG_FILTER: &str = "blockvol=warn";

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Volume(#[from] VolumeError),
    #[error("state error: {0}")]
    State(#[from] StateStoreError),
    #[error("no volume state found at {0}; run create or import first")]
    MissingState(Utf8PathBuf),
    #[error("failed to render volume record: {0}")]
    Output(String),
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli).await {
        Ok(Some(record)) => match write_record(io::stdout(), &record) {
            Ok(()) => 0,
            Err(err) => {
                report_error(&err);
                1
            }
        },
        Ok(None) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(filter)
        .init();
}

async fn dispatch(cli: Cli) -> Result<Option<VolumeRecord>, CliError> {
    match cli {
        Cli::Create(command) => create(command).await.map(Some),
        Cli::Read(args) => read(args).await.map(Some),
        Cli::Update(command) => update(command).await.map(Some),
        Cli::Delete(args) => delete(args).await.map(|()| None),
        Cli::Import(command) => import(command).await.map(Some),
    }
}

fn live_resource() -> Result<LiveResource, CliError> {
    let config =
        ProviderConfig::load_without_cli_args().map_err(|err| CliError::Config(err.to_string()))?;
    Ok(VolumeResource::from_config(&config)?)
}

fn state_store(args: &StateArgs) -> StateStore {
    StateStore::new(Utf8PathBuf::from(&args.state))
}

fn load_record(store: &StateStore) -> Result<VolumeRecord, CliError> {
    store
        .load()?
        .ok_or_else(|| CliError::MissingState(store.path().to_path_buf()))
}

async fn create(command: ApplyCommand) -> Result<VolumeRecord, CliError> {
    let config = read_volume_config(Utf8Path::new(&command.config))?;
    let store = state_store(&command.state);
    let resource = live_resource()?;

    let mut record = VolumeRecord::new(config);
    let outcome = resource.create(&mut record).await;
    if record.id.is_some() {
        store.save(&record)?;
    }
    outcome?;
    Ok(record)
}

async fn read(args: StateArgs) -> Result<VolumeRecord, CliError> {
    let store = state_store(&args);
    let mut record = load_record(&store)?;
    let resource = live_resource()?;

    if let Err(err) = resource.read(&mut record).await {
        if err.is_not_found() {
            warn!(path = %store.path(), "volume no longer exists; dropping state");
            store.remove()?;
        }
        return Err(err.into());
    }
    store.save(&record)?;
    Ok(record)
}

async fn update(command: ApplyCommand) -> Result<VolumeRecord, CliError> {
    let config = read_volume_config(Utf8Path::new(&command.config))?;
    let store = state_store(&command.state);
    let mut record = load_record(&store)?;
    let resource = live_resource()?;

    record.config = config;
    let outcome = resource.update(&mut record).await?;
    info!(extended = outcome.extended, retyped = outcome.retyped, "volume updated");
    store.save(&record)?;
    Ok(record)
}

async fn delete(args: StateArgs) -> Result<(), CliError> {
    let store = state_store(&args);
    let mut record = load_record(&store)?;
    let resource = live_resource()?;

    resource.delete(&mut record).await?;
    store.remove()?;
    Ok(())
}

async fn import(command: ImportCommand) -> Result<VolumeRecord, CliError> {
    let identity = command.id.parse::<VolumeIdentity>()?;
    let store = state_store(&command.state);
    let resource = live_resource()?;

    let record = resource.import_identity(identity).await?;
    store.save(&record)?;
    Ok(record)
}

fn write_record(mut target: impl Write, record: &VolumeRecord) -> Result<(), CliError> {
    let rendered =
        serde_json::to_string_pretty(record).map_err(|err| CliError::Output(err.to_string()))?;
    writeln!(target, "{rendered}").map_err(|err| CliError::Output(err.to_string()))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockvol::VolumeConfig;
    use tempfile::TempDir;

    fn temp_state(tmp: &TempDir) -> String {
        tmp.path()
            .join("state.json")
            .to_str()
            .unwrap_or_else(|| panic!("temp path should be utf8"))
            .to_owned()
    }

    #[tokio::test]
    async fn import_rejects_malformed_identifier_before_loading_config() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let command = ImportCommand {
            id: String::from("vol-only"),
            state: StateArgs {
                state: temp_state(&tmp),
            },
        };

        let err = import(command).await.expect_err("identifier is malformed");
        assert!(
            matches!(err, CliError::Volume(VolumeError::InvalidImportId { .. })),
            "unexpected error: {err}"
        );
    }

    #[tokio::test]
    async fn read_without_state_reports_missing_state() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let args = StateArgs {
            state: temp_state(&tmp),
        };

        let err = read(args).await.expect_err("no state file");
        assert!(
            matches!(err, CliError::MissingState(_)),
            "unexpected error: {err}"
        );
        assert!(err.to_string().contains("run create or import first"));
    }

    #[test]
    fn write_record_renders_pretty_json() {
        let record = VolumeRecord {
            id: Some(String::from("vol-123")),
            config: VolumeConfig {
                name: String::from("data"),
                size: 10,
                ..VolumeConfig::default()
            },
            observed: None,
        };
        let mut buf = Vec::new();
        write_record(&mut buf, &record).unwrap_or_else(|err| panic!("render: {err}"));

        let rendered = String::from_utf8(buf).expect("utf8");
        let parsed: VolumeRecord = serde_json::from_str(&rendered).expect("json");
        assert_eq!(parsed, record);
        assert!(rendered.ends_with('\n'));
    }

    #[test]
    fn write_error_writes_cli_error() {
        let mut buf = Vec::new();
        let err = CliError::Volume(VolumeError::MissingIdentity);
        write_error(&mut buf, &err);
        let rendered = String::from_utf8(buf).expect("utf8");
        assert!(
            rendered.contains("volume record has no identifier"),
            "rendered: {rendered}"
        );
    }
}

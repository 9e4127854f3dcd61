//! Command-line interface definitions for the `blockvol` binary.
//!
//! This module centralises the clap parser structures so both the main binary
//! and the build script can reuse them when generating the manual page.

use clap::{Args, Parser};

/// Top-level CLI for the `blockvol` binary.
#[derive(Debug, Parser)]
#[command(
    name = "blockvol",
    about = "Create, inspect, resize and delete provider block-storage volumes",
    arg_required_else_help = true
)]
pub(crate) enum Cli {
    /// Create a volume from a JSON configuration file.
    #[command(name = "create", about = "Create a volume from a JSON configuration file")]
    Create(ApplyCommand),
    /// Refresh the stored volume record from the provider.
    #[command(name = "read", about = "Refresh the stored volume record from the provider")]
    Read(StateArgs),
    /// Extend or retype the stored volume to match a JSON configuration file.
    #[command(
        name = "update",
        about = "Extend or retype the stored volume to match a JSON configuration file"
    )]
    Update(ApplyCommand),
    /// Delete the stored volume.
    #[command(name = "delete", about = "Delete the stored volume")]
    Delete(StateArgs),
    /// Adopt an existing volume identified by `<project_id>:<region_id>:<volume_id>`.
    #[command(name = "import", about = "Adopt an existing volume")]
    Import(ImportCommand),
}

/// Location of the volume state file.
#[derive(Debug, Args)]
pub(crate) struct StateArgs {
    /// Path of the JSON state file holding the volume record.
    #[arg(long, value_name = "PATH", default_value = "blockvol.state.json")]
    pub(crate) state: String,
}

/// Arguments for subcommands that apply a desired configuration.
#[derive(Debug, Args)]
pub(crate) struct ApplyCommand {
    /// Path of the JSON file describing the desired volume.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: String,
    #[command(flatten)]
    pub(crate) state: StateArgs,
}

/// Arguments for the `blockvol import` subcommand.
#[derive(Debug, Args)]
pub(crate) struct ImportCommand {
    /// Import identifier in the form `<project_id>:<region_id>:<volume_id>`.
    #[arg(value_name = "ID")]
    pub(crate) id: String,
    #[command(flatten)]
    pub(crate) state: StateArgs,
}

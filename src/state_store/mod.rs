//! On-disk persistence for volume records and desired configuration.
//!
//! The CLI keeps one [`VolumeRecord`] per state file, rendered as pretty
//! JSON, so successive invocations behave like a declarative framework
//! handing the same record back to each callback.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;

use crate::volume::{VolumeConfig, VolumeRecord};

/// Default state file used by the CLI.
pub const DEFAULT_STATE_FILE: &str = "blockvol.state.json";

/// Errors raised while reading or writing state files.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum StateStoreError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a file does not contain the expected JSON document.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a record cannot be rendered.
    #[error("failed to render state for {path}: {message}")]
    Render {
        /// Destination path.
        path: Utf8PathBuf,
        /// Serialiser error message.
        message: String,
    },
    /// Raised when the path does not name a file.
    #[error("invalid path {path}: {message}")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
        /// Why the path is unusable.
        message: String,
    },
}

/// Reads and writes a single [`VolumeRecord`] file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StateStore {
    path: Utf8PathBuf,
}

impl StateStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the state file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Loads the stored record, returning `None` when no state file exists.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] when the file cannot be read or parsed.
    pub fn load(&self) -> Result<Option<VolumeRecord>, StateStoreError> {
        if !path_exists(&self.path)? {
            return Ok(None);
        }
        let contents = read_file(&self.path)?;
        parse_json(&self.path, &contents).map(Some)
    }

    /// Writes `record`, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError`] when rendering or writing fails.
    pub fn save(&self, record: &VolumeRecord) -> Result<(), StateStoreError> {
        let rendered =
            serde_json::to_string_pretty(record).map_err(|err| StateStoreError::Render {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        let (parent, file_name) = split_path(&self.path)?;
        Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(|err| {
            StateStoreError::Io {
                path: parent.to_path_buf(),
                message: err.to_string(),
            }
        })?;
        open_dir(parent)?
            .write(file_name, format!("{rendered}\n"))
            .map_err(|err| StateStoreError::Io {
                path: self.path.clone(),
                message: err.to_string(),
            })
    }

    /// Deletes the state file. Returns `false` when there was nothing to
    /// delete.
    ///
    /// # Errors
    ///
    /// Returns [`StateStoreError::Io`] when removal fails.
    pub fn remove(&self) -> Result<bool, StateStoreError> {
        if !path_exists(&self.path)? {
            return Ok(false);
        }
        let (parent, file_name) = split_path(&self.path)?;
        open_dir(parent)?
            .remove_file(file_name)
            .map_err(|err| StateStoreError::Io {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        Ok(true)
    }
}

/// Reads a desired volume configuration from a JSON file.
///
/// # Errors
///
/// Returns [`StateStoreError`] when the file cannot be read or parsed.
pub fn read_volume_config(path: &Utf8Path) -> Result<VolumeConfig, StateStoreError> {
    let contents = read_file(path)?;
    parse_json(path, &contents)
}

fn split_path(path: &Utf8Path) -> Result<(&Utf8Path, &str), StateStoreError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StateStoreError::InvalidPath {
            path: path.to_path_buf(),
            message: String::from("path is missing a filename"),
        })?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    Ok((parent, file_name))
}

fn open_dir(dir: &Utf8Path) -> Result<Dir, StateStoreError> {
    Dir::open_ambient_dir(dir, ambient_authority()).map_err(|err| StateStoreError::Io {
        path: dir.to_path_buf(),
        message: err.to_string(),
    })
}

fn path_exists(path: &Utf8Path) -> Result<bool, StateStoreError> {
    let (parent, file_name) = split_path(path)?;
    match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir.try_exists(file_name).map_err(|err| StateStoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(StateStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

fn read_file(path: &Utf8Path) -> Result<String, StateStoreError> {
    let (parent, file_name) = split_path(path)?;
    open_dir(parent)?
        .read_to_string(file_name)
        .map_err(|err| StateStoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn parse_json<T: serde::de::DeserializeOwned>(
    path: &Utf8Path,
    contents: &str,
) -> Result<T, StateStoreError> {
    serde_json::from_str(contents).map_err(|err| StateStoreError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests;

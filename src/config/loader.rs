//! Layered configuration loading from disk.
//!
//! A config directory holds a required `base.toml` and an optional
//! `<environment>.toml` overlay. The overlay is deep-merged on top of the
//! base, then the merged table is decoded into the caller's schema.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use toml::{Table, Value};

use crate::config::validation::{Validate, ValidationError};

/// File extension shared by the base document and every overlay.
pub const CONFIG_EXTENSION: &str = "toml";

/// Name (without extension) of the required base document.
pub const BASE_NAME: &str = "base";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config directory path was empty.
    #[error("config directory cannot be empty")]
    EmptyDirectory,

    /// `base.toml` does not exist or is not valid TOML.
    #[error("base config missing or unparsable at {}", path.display())]
    MissingBase {
        path: PathBuf,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// A document exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A document is not valid TOML.
    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The merged tree does not fit the target schema.
    #[error("failed to decode merged config: {0}")]
    Decode(#[source] toml::de::Error),

    /// The decoded config is missing required values.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load `base` plus the `environment` overlay from `dir`, decode into `T`
/// and run its required-field validation.
pub fn load_config<T>(dir: &Path, environment: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned + Validate,
{
    let merged = load_merged(dir, environment)?;
    let config = decode::<T>(merged)?;
    config.validate().map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and merge both documents without decoding.
pub fn load_merged(dir: &Path, environment: &str) -> Result<Table, ConfigError> {
    if dir.as_os_str().is_empty() {
        return Err(ConfigError::EmptyDirectory);
    }

    let base_path = document_path(dir, BASE_NAME);
    let mut base = match read_document(&base_path) {
        Ok(Some(table)) => table,
        Ok(None) => {
            return Err(ConfigError::MissingBase {
                path: base_path,
                source: None,
            })
        }
        Err(ConfigError::Parse { path, source }) => {
            return Err(ConfigError::MissingBase {
                path,
                source: Some(source),
            })
        }
        Err(e) => return Err(e),
    };

    if !environment.is_empty() {
        let overlay_path = document_path(dir, environment);
        match read_document(&overlay_path)? {
            Some(overlay) => {
                tracing::debug!(path = %overlay_path.display(), "Applying config overlay");
                merge_tables(&mut base, overlay);
            }
            None => {
                tracing::debug!(
                    path = %overlay_path.display(),
                    "No config overlay for environment, using base only"
                );
            }
        }
    }

    Ok(base)
}

/// Project a merged table onto a typed schema. Unknown keys are ignored.
pub fn decode<T: DeserializeOwned>(table: Table) -> Result<T, ConfigError> {
    Value::Table(table).try_into::<T>().map_err(ConfigError::Decode)
}

/// Deep merge: tables merge recursively, everything else in `overlay`
/// replaces the value in `base` wholesale.
pub fn merge_tables(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        let incoming = match value {
            Value::Table(incoming) => incoming,
            other => {
                base.insert(key, other);
                continue;
            }
        };

        if let Some(Value::Table(existing)) = base.get_mut(&key) {
            merge_tables(existing, incoming);
            continue;
        }
        base.insert(key, Value::Table(incoming));
    }
}

fn document_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.{CONFIG_EXTENSION}"))
}

/// Read and parse a document. `Ok(None)` when the file does not exist.
fn read_document(path: &Path) -> Result<Option<Table>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str::<Table>(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

//! Crate-level error for the startup path.

use thiserror::Error;

use crate::config::ConfigError;
use crate::observability::LoggingError;
use crate::rpc::{RegistryError, ServerError};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Logging(#[from] LoggingError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! # Vis Core Kernel Errors
//!
//! Defines the top-level [`Error`] type of the crate.
//!
//! Each subsystem owns a typed error enum ([`PluginSystemError`],
//! [`NavigationError`], [`StorageSystemError`]); this module aggregates them so
//! public APIs can return a single `Result` alias and callers can still match
//! on the subsystem variant.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::navigation::error::NavigationError;
use crate::plugin_system::error::{PluginLoadError, PluginSystemError};
use crate::storage::error::StorageSystemError;

/// Custom error type for the Vis kernel
#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed plugin system error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Typed navigation composition error
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Typed storage and configuration error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<PluginLoadError> for Error {
    fn from(err: PluginLoadError) -> Self {
        Error::PluginSystem(PluginSystemError::Load(err))
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Wrap an I/O error with the operation and path it happened on
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }

    /// The plugin load failure behind this error, if any
    pub fn as_load_error(&self) -> Option<&PluginLoadError> {
        match self {
            Error::PluginSystem(PluginSystemError::Load(err)) => Some(err),
            _ => None,
        }
    }
}

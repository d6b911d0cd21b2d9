//! # Vis Core Kernel
//!
//! Shared foundations of the plugin kernel.
//!
//! - **Error Handling**: the aggregated [`Error`](error::Error) type and the
//!   `Result` alias every public API returns.
//! - **Host Container**: the [`ServiceContainer`](container::ServiceContainer)
//!   interface plugins are exposed to, plus an in-memory implementation.
//! - **Constants**: well-known file names, directory names and reserved ids.
pub mod constants;
pub mod container;
pub mod error;

pub use container::{DefinitionContainer, ServiceContainer, ServiceDefinition};
pub use error::{Error, Result};

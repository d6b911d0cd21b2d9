//! # Vis Core Storage
//!
//! File-backed state of the plugin kernel: the project configuration
//! ([`VisConfig`]), the persisted plugin manifest ([`ManifestStore`]), static
//! asset mirroring into the public tree and the cache invalidation hook
//! ([`ConsoleRunner`]).
pub mod assets;
pub mod config;
pub mod console;
pub mod error;
pub mod manifest_store;

pub use config::{ConfigFormat, ModuleLoaderSettings, NavigationSettings, VisConfig};
pub use console::{ConsoleRunner, ProcessConsole};
pub use error::StorageSystemError;
pub use manifest_store::ManifestStore;

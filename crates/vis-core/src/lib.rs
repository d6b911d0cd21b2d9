//! # Vis Core
//!
//! Plugin kernel of the Vis bundle: discovery and two-phase bootstrap of
//! optional plugin modules, the persisted plugin manifest with its activation
//! lifecycle, and the navigation composer active plugins contribute menus to.
pub mod kernel;
pub mod navigation;
pub mod plugin_system;
pub mod storage;
pub mod utils;

// Re-export key public types/traits for the binary and plugins
pub use kernel::error::{Error, Result};
pub use kernel::container::{DefinitionContainer, ServiceContainer};
pub use navigation::{MenuComposer, Navigation, SidebarItem, Tool, TopbarItem};
pub use plugin_system::{
    ClassRegistry, JsonManifestSource, KernelPlugin, KernelPluginLoader, PluginArgs,
    PluginManifestEntry, PluginRegistry, PluginService, TypeKey,
};
pub use storage::VisConfig;

#[cfg(test)]
mod tests;

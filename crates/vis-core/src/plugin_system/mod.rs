//! # Vis Core Plugin System
//!
//! Discovery, registration and lifecycle of kernel plugins.
//!
//! ## Key Submodules and Responsibilities:
//!
//! - **[`manifest`]** / **[`descriptor`]**: the persisted manifest entries
//!   ([`PluginManifestEntry`]) and the per-plugin package descriptor they are
//!   built from.
//! - **[`path`]**: maps plugin-declared source directories into the project
//!   tree and rejects plugins rooted outside of it.
//! - **[`module_loader`]**: the [`ModuleLoader`] interface the namespaces are
//!   registered with, and [`NamespaceLoader`], a loader resolving type names
//!   through prefix mappings and class maps.
//! - **[`factory`]**: the [`ClassRegistry`] of plugin constructors.
//! - **[`traits`]**: the [`KernelPlugin`] trait and [`TypeKey`] identity.
//! - **[`registry`]**: the [`PluginRegistry`], one instance per plugin type.
//! - **[`loader`]**: the two-phase bootstrap ([`KernelPluginLoader`]).
//! - **[`service`]**: enabling, disabling and rediscovering plugins
//!   ([`PluginService`]).
//! - **[`error`]**: [`PluginLoadError`] and [`PluginSystemError`].
pub mod descriptor;
pub mod error;
pub mod factory;
pub mod loader;
pub mod manifest;
pub mod module_loader;
pub mod path;
pub mod registry;
pub mod service;
pub mod traits;

pub use descriptor::PackageDescriptor;
pub use error::{PluginLoadError, PluginSystemError};
pub use factory::{ClassRegistry, PluginArgs};
pub use loader::{ActiveBundle, JsonManifestSource, KernelPluginLoader, LoaderState, ManifestSource};
pub use manifest::{Autoload, MappingStrategy, PluginManifestEntry, SourceDirs};
pub use module_loader::{ClassMap, ModuleLoader, NamespaceLoader};
pub use registry::PluginRegistry;
pub use service::PluginService;
pub use traits::{KernelPlugin, PluginContext, TypeKey};

#[cfg(test)]
mod tests;

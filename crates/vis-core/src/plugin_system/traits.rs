use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::kernel::container::ServiceContainer;
use crate::kernel::error::Result;
use crate::navigation::composer::MenuComposer;
use crate::plugin_system::manifest::PluginManifestEntry;

/// Identity of a concrete plugin type.
///
/// Equality and hashing use the `TypeId` only; the name is kept for
/// diagnostics and container service ids.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified Rust type name
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// What a lifecycle hook gets to work with
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// The host's dependency-injection container
    pub container: Arc<dyn ServiceContainer>,
    /// The manifest entry the plugin was built from
    pub entry: PluginManifestEntry,
    /// The entry as persisted, for keys this crate does not model
    pub raw: Value,
}

impl PluginContext {
    pub fn new(container: Arc<dyn ServiceContainer>, entry: PluginManifestEntry) -> Self {
        let raw = entry.to_value();
        Self {
            container,
            entry,
            raw,
        }
    }
}

/// Core trait that all kernel plugins must implement
#[async_trait]
pub trait KernelPlugin: Any + Send + Sync {
    /// The name of the plugin
    fn name(&self) -> &str;

    /// Whether the plugin was enabled in the manifest
    fn is_active(&self) -> bool;

    /// Plugin root as declared in the manifest
    fn path(&self) -> &str;

    /// Concrete type identity, usually `TypeKey::of::<Self>()`
    fn type_key(&self) -> TypeKey;

    /// Cast to Any to allow downcasting to the concrete plugin
    fn as_any(&self) -> &dyn Any;

    /// Runs once when the plugin gets enabled
    async fn activate(&self, _context: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Runs when the manifest is rebuilt while the plugin is enabled
    async fn update(&self, _context: &PluginContext) -> Result<()> {
        Ok(())
    }

    /// Contribute tools, topbar and sidebar items to the navigation
    fn build_navigation(&self, _composer: &mut MenuComposer) -> Result<()> {
        Ok(())
    }
}

impl fmt::Debug for dyn KernelPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KernelPlugin")
            .field("name", &self.name())
            .field("type", &self.type_key())
            .field("active", &self.is_active())
            .finish()
    }
}

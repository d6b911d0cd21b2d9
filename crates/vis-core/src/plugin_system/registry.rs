use std::collections::HashMap;
use std::sync::Arc;

use crate::plugin_system::traits::{KernelPlugin, TypeKey};

/// Insertion-ordered collection of plugin instances, one per concrete type
#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn KernelPlugin>>,
    index: HashMap<TypeKey, usize>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a plugin unless one of the same type is already registered.
    ///
    /// Returns whether the plugin was inserted.
    pub fn add(&mut self, plugin: Arc<dyn KernelPlugin>) -> bool {
        let key = plugin.type_key();
        if self.index.contains_key(&key) {
            log::debug!("Plugin type {} already registered, keeping the first instance", key);
            return false;
        }
        self.index.insert(key, self.plugins.len());
        self.plugins.push(plugin);
        true
    }

    /// Add every plugin in order
    pub fn add_all<I>(&mut self, plugins: I)
    where
        I: IntoIterator<Item = Arc<dyn KernelPlugin>>,
    {
        for plugin in plugins {
            self.add(plugin);
        }
    }

    pub fn has<T: KernelPlugin>(&self) -> bool {
        self.has_key(&TypeKey::of::<T>())
    }

    pub fn has_key(&self, key: &TypeKey) -> bool {
        self.index.contains_key(key)
    }

    /// Get the plugin of type `T`
    pub fn get<T: KernelPlugin>(&self) -> Option<&T> {
        self.get_by_key(&TypeKey::of::<T>())
            .and_then(|plugin| plugin.as_any().downcast_ref::<T>())
    }

    pub fn get_by_key(&self, key: &TypeKey) -> Option<&Arc<dyn KernelPlugin>> {
        self.index.get(key).map(|&i| &self.plugins[i])
    }

    /// All plugins in insertion order
    pub fn all(&self) -> &[Arc<dyn KernelPlugin>] {
        &self.plugins
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn KernelPlugin>> {
        self.plugins.iter()
    }

    /// Plugins reporting themselves active, in insertion order
    pub fn active_only(&self) -> Vec<Arc<dyn KernelPlugin>> {
        self.plugins
            .iter()
            .filter(|plugin| plugin.is_active())
            .cloned()
            .collect()
    }

    /// A new registry holding the plugins matching `predicate`
    pub fn filter<F>(&self, predicate: F) -> PluginRegistry
    where
        F: Fn(&dyn KernelPlugin) -> bool,
    {
        let mut filtered = PluginRegistry::new();
        for plugin in &self.plugins {
            if predicate(plugin.as_ref()) {
                filtered.add(Arc::clone(plugin));
            }
        }
        filtered
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Plugin names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.plugins.iter().map(|p| p.name().to_string()).collect()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.plugins.iter()).finish()
    }
}

//! Constructor registry standing in for runtime class instantiation.
//!
//! Plugins register a constructor under their class name when the host
//! links them in. The loader then builds instances from manifest entries by
//! looking the declared class up here.
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::plugin_system::error::PluginLoadError;
use crate::plugin_system::traits::KernelPlugin;

/// Arguments every plugin constructor receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginArgs {
    pub active: bool,
    /// Plugin root as declared in the manifest
    pub path: String,
    pub project_root: PathBuf,
}

type PluginConstructor = Arc<dyn Fn(PluginArgs) -> Box<dyn KernelPlugin> + Send + Sync>;
type TypeConstructor = Arc<dyn Fn(PluginArgs) -> Box<dyn Any + Send + Sync> + Send + Sync>;

#[derive(Clone)]
enum Constructor {
    Plugin(PluginConstructor),
    /// A registered type that is not a kernel plugin
    Other(TypeConstructor),
}

/// Class name → constructor
#[derive(Clone, Default)]
pub struct ClassRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin constructor, replacing any previous one for `class`
    pub fn register_plugin<F>(&mut self, class: &str, constructor: F)
    where
        F: Fn(PluginArgs) -> Box<dyn KernelPlugin> + Send + Sync + 'static,
    {
        self.constructors
            .insert(class.to_string(), Constructor::Plugin(Arc::new(constructor)));
    }

    /// Register a constructor for a type that does not implement [`KernelPlugin`].
    ///
    /// Hosts register helper types this way; naming one as a plugin class in a
    /// manifest is a load error.
    pub fn register_type<F>(&mut self, class: &str, constructor: F)
    where
        F: Fn(PluginArgs) -> Box<dyn Any + Send + Sync> + Send + Sync + 'static,
    {
        self.constructors
            .insert(class.to_string(), Constructor::Other(Arc::new(constructor)));
    }

    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    /// Registered class names, sorted
    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.constructors.keys().cloned().collect();
        classes.sort();
        classes
    }

    /// Build the plugin registered under `class`.
    ///
    /// Returns `Ok(None)` for unknown classes and
    /// [`PluginLoadError::BaseTypeMismatch`] when `class` is registered as a
    /// non-plugin type. `plugin` names the manifest entry in that error.
    pub fn instantiate(
        &self,
        plugin: &str,
        class: &str,
        args: PluginArgs,
    ) -> Result<Option<Box<dyn KernelPlugin>>, PluginLoadError> {
        match self.constructors.get(class) {
            None => Ok(None),
            Some(Constructor::Plugin(constructor)) => Ok(Some(constructor(args))),
            Some(Constructor::Other(_)) => Err(PluginLoadError::BaseTypeMismatch {
                plugin: plugin.to_string(),
                class: class.to_string(),
            }),
        }
    }

    /// Build a non-plugin type registered with [`register_type`](Self::register_type)
    pub fn instantiate_type(&self, class: &str, args: PluginArgs) -> Option<Box<dyn Any + Send + Sync>> {
        match self.constructors.get(class) {
            Some(Constructor::Other(constructor)) => Some(constructor(args)),
            _ => None,
        }
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes())
            .finish()
    }
}

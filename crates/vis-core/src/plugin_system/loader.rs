//! Two-phase plugin bootstrap.
//!
//! [`KernelPluginLoader::initialize`] loads the manifests from a
//! [`ManifestSource`], registers every plugin's namespace mappings with the
//! [`ModuleLoader`] and only then instantiates the plugin classes, so a plugin
//! type can always be resolved from its own sources. Any
//! [`PluginLoadError`](crate::plugin_system::error::PluginLoadError) aborts
//! the bootstrap and leaves the loader unusable.
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use crate::kernel::constants;
use crate::kernel::container::{ServiceContainer, ServiceDefinition};
use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::{PluginLoadError, PluginSystemError};
use crate::plugin_system::factory::{ClassRegistry, PluginArgs};
use crate::plugin_system::manifest::PluginManifestEntry;
use crate::plugin_system::module_loader::{generate_class_map, ModuleLoader, NamespaceLoader};
use crate::plugin_system::path::map_source_directories;
use crate::plugin_system::registry::PluginRegistry;
use crate::plugin_system::traits::{KernelPlugin, TypeKey};
use crate::storage::config::VisConfig;

/// Where the loader gets its manifest entries from
#[async_trait]
pub trait ManifestSource: Send + Sync {
    async fn load_manifests(&self) -> Result<Vec<PluginManifestEntry>>;
}

/// Reads the persisted JSON manifest array
#[derive(Debug, Clone)]
pub struct JsonManifestSource {
    path: PathBuf,
}

impl JsonManifestSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ManifestSource for JsonManifestSource {
    async fn load_manifests(&self) -> Result<Vec<PluginManifestEntry>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No plugin manifest at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(e, "read_manifest", self.path.clone())),
        };
        Ok(PluginManifestEntry::parse_list(&content, &self.path)?)
    }
}

/// A fixed list of entries, for hosts that assemble manifests themselves
#[async_trait]
impl ManifestSource for Vec<PluginManifestEntry> {
    async fn load_manifests(&self) -> Result<Vec<PluginManifestEntry>> {
        Ok(self.clone())
    }
}

/// Bootstrap progress of a [`KernelPluginLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Uninitialized,
    ManifestsLoaded,
    NamespacesRegistered,
    /// Terminal; further `initialize` calls are no-ops
    Instantiated,
}

/// Something the host loads as part of its module graph
#[derive(Debug, Clone)]
pub enum ActiveBundle {
    Plugin(Arc<dyn KernelPlugin>),
    /// The host bundle owning the loader
    Host,
}

impl ActiveBundle {
    pub fn name(&self) -> &str {
        match self {
            ActiveBundle::Plugin(plugin) => plugin.name(),
            ActiveBundle::Host => constants::HOST_BUNDLE_NAME,
        }
    }
}

/// Orchestrates manifest loading, namespace registration and instantiation
pub struct KernelPluginLoader {
    source: Box<dyn ManifestSource>,
    module_loader: Box<dyn ModuleLoader>,
    classes: ClassRegistry,
    state: LoaderState,
    manifests: Vec<PluginManifestEntry>,
    registry: PluginRegistry,
}

impl KernelPluginLoader {
    pub fn new(
        source: Box<dyn ManifestSource>,
        module_loader: Box<dyn ModuleLoader>,
        classes: ClassRegistry,
    ) -> Self {
        Self {
            source,
            module_loader,
            classes,
            state: LoaderState::Uninitialized,
            manifests: Vec::new(),
            registry: PluginRegistry::new(),
        }
    }

    /// Loader reading the project's persisted manifest through a [`NamespaceLoader`]
    pub fn from_config(config: &VisConfig, classes: ClassRegistry) -> Self {
        let settings = &config.module_loader;
        Self::new(
            Box::new(JsonManifestSource::new(config.manifest_path())),
            Box::new(NamespaceLoader::new(&settings.extension, settings.authoritative)),
            classes,
        )
    }

    pub fn state(&self) -> LoaderState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.state == LoaderState::Instantiated
    }

    /// Manifest entries as loaded in the first phase
    pub fn manifests(&self) -> &[PluginManifestEntry] {
        &self.manifests
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn module_loader(&self) -> &dyn ModuleLoader {
        self.module_loader.as_ref()
    }

    /// Run the whole bootstrap. A no-op once the loader is initialized.
    pub async fn initialize(&mut self, project_root: &Path) -> Result<()> {
        match self.state {
            LoaderState::Instantiated => return Ok(()),
            LoaderState::Uninitialized => {}
            state => {
                return Err(PluginSystemError::InvalidState {
                    state,
                    expected: LoaderState::Uninitialized,
                }
                .into())
            }
        }

        self.manifests = self.source.load_manifests().await?;
        self.state = LoaderState::ManifestsLoaded;
        log::debug!("Loaded {} plugin manifest entries", self.manifests.len());

        if self.manifests.is_empty() {
            self.state = LoaderState::Instantiated;
            log::info!("No plugins declared, plugin registry is empty");
            return Ok(());
        }

        self.register_namespaces(project_root)?;
        self.instantiate_plugins(project_root)?;
        log::info!(
            "Plugin bootstrap complete: {} plugin(s), {} active",
            self.registry.len(),
            self.registry.active_only().len()
        );
        Ok(())
    }

    /// Second phase: register the namespace mappings of every entry
    pub fn register_namespaces(&mut self, project_root: &Path) -> Result<()> {
        self.expect_state(LoaderState::ManifestsLoaded)?;
        let authoritative = self.module_loader.is_class_map_authoritative();
        let extension = self.module_loader.source_extension().to_string();

        for entry in &self.manifests {
            let plugin = entry.display_name();
            let autoload = entry.autoload.as_ref().ok_or_else(|| PluginLoadError::AutoloadMissing {
                plugin: plugin.to_string(),
            })?;
            if !autoload.has_strategy() {
                return Err(PluginLoadError::MappingStrategyMissing {
                    plugin: plugin.to_string(),
                }
                .into());
            }

            for (strategy, mappings) in autoload.strategies() {
                for (prefix, dirs) in mappings {
                    let resolved =
                        map_source_directories(plugin, &dirs.to_vec(), project_root, &entry.path)?;

                    if authoritative {
                        for dir in &resolved {
                            let class_map = generate_class_map(dir, prefix, strategy, &extension)
                                .map_err(|e| Error::io(e, "generate_class_map", dir.clone()))?;
                            self.module_loader.add_class_map(class_map);
                        }
                    }
                    self.module_loader.add_namespace(prefix, resolved, strategy);
                }
            }
        }

        self.state = LoaderState::NamespacesRegistered;
        Ok(())
    }

    /// Third phase: build one instance per resolvable plugin class
    pub fn instantiate_plugins(&mut self, project_root: &Path) -> Result<()> {
        self.expect_state(LoaderState::NamespacesRegistered)?;

        for entry in &self.manifests {
            let Some(class) = entry.class() else {
                log::debug!("Skipping plugin '{}' without a plugin class", entry.display_name());
                continue;
            };
            match self.module_loader.resolve_type_file(class) {
                Some(file) if file.is_file() => {}
                _ => {
                    log::debug!("Skipping plugin class '{}': no source file found", class);
                    continue;
                }
            }

            let args = PluginArgs {
                active: entry.active,
                path: entry.path.clone(),
                project_root: project_root.to_path_buf(),
            };
            match self.classes.instantiate(entry.display_name(), class, args)? {
                Some(plugin) => {
                    log::debug!("Instantiated plugin '{}' ({})", plugin.name(), class);
                    self.registry.add(Arc::from(plugin));
                }
                None => log::debug!("Skipping plugin class '{}': no constructor registered", class),
            }
        }

        self.state = LoaderState::Instantiated;
        Ok(())
    }

    /// Bundles the host should load: each active plugin not loaded yet, then
    /// the host bundle itself.
    ///
    /// Names are checked against and pushed to `already_loaded` as the
    /// iterator is consumed.
    pub fn active_bundles<'a>(&self, already_loaded: &'a mut Vec<String>) -> ActiveBundles<'a> {
        ActiveBundles {
            pending: self.registry.active_only().into_iter(),
            host_pending: true,
            already_loaded,
        }
    }

    /// Register every active plugin type with the host container as an
    /// autowired, public service. Does nothing before initialization.
    pub fn attach_to_container(&self, container: &dyn ServiceContainer) {
        if !self.is_initialized() {
            return;
        }
        for plugin in self.registry.active_only() {
            let id = plugin.type_key().name();
            if !container.has(id) {
                container.register(id, ServiceDefinition::new(id));
            }
            container.set_autowired(id, true);
            container.set_public(id, true);
            log::debug!("Attached plugin '{}' to the container as {}", plugin.name(), id);
        }
    }

    /// The plugin of type `T`, if it is registered and active
    pub fn active_instance<T: KernelPlugin>(&self) -> Option<&T> {
        self.registry.get::<T>().filter(|plugin| plugin.is_active())
    }

    pub fn active_instance_by_key(&self, key: &TypeKey) -> Option<Arc<dyn KernelPlugin>> {
        self.registry
            .get_by_key(key)
            .filter(|plugin| plugin.is_active())
            .cloned()
    }

    fn expect_state(&self, expected: LoaderState) -> Result<()> {
        if self.state != expected {
            return Err(PluginSystemError::InvalidState {
                state: self.state,
                expected,
            }
            .into());
        }
        Ok(())
    }
}

impl std::fmt::Debug for KernelPluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelPluginLoader")
            .field("state", &self.state)
            .field("manifests", &self.manifests.len())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Lazy iterator returned by [`KernelPluginLoader::active_bundles`]
pub struct ActiveBundles<'a> {
    pending: std::vec::IntoIter<Arc<dyn KernelPlugin>>,
    host_pending: bool,
    already_loaded: &'a mut Vec<String>,
}

impl Iterator for ActiveBundles<'_> {
    type Item = ActiveBundle;

    fn next(&mut self) -> Option<Self::Item> {
        for plugin in self.pending.by_ref() {
            if self.already_loaded.iter().any(|name| name == plugin.name()) {
                continue;
            }
            self.already_loaded.push(plugin.name().to_string());
            return Some(ActiveBundle::Plugin(plugin));
        }

        if self.host_pending {
            self.host_pending = false;
            if !self.already_loaded.iter().any(|name| name == constants::HOST_BUNDLE_NAME) {
                self.already_loaded.push(constants::HOST_BUNDLE_NAME.to_string());
                return Some(ActiveBundle::Host);
            }
        }
        None
    }
}

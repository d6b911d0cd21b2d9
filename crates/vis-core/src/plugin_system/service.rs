//! Management of the persisted plugin manifest.
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tokio_stream::wrappers::ReadDirStream;
use tokio_stream::StreamExt;

use crate::kernel::container::ServiceContainer;
use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::descriptor::PackageDescriptor;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::factory::{ClassRegistry, PluginArgs};
use crate::plugin_system::manifest::PluginManifestEntry;
use crate::plugin_system::traits::PluginContext;
use crate::storage::assets;
use crate::storage::config::VisConfig;
use crate::storage::console::ConsoleRunner;
use crate::storage::error::StorageSystemError;
use crate::storage::manifest_store::ManifestStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleHook {
    Activate,
    Update,
}

impl LifecycleHook {
    fn as_str(&self) -> &'static str {
        match self {
            LifecycleHook::Activate => "activate",
            LifecycleHook::Update => "update",
        }
    }
}

/// Enables, disables and rediscovers plugins of one project
#[derive(Debug)]
pub struct PluginService {
    config: VisConfig,
    classes: ClassRegistry,
    container: Arc<dyn ServiceContainer>,
    console: Arc<dyn ConsoleRunner>,
    store: ManifestStore,
}

impl PluginService {
    pub fn new(
        config: VisConfig,
        classes: ClassRegistry,
        container: Arc<dyn ServiceContainer>,
        console: Arc<dyn ConsoleRunner>,
    ) -> Self {
        let store = ManifestStore::new(config.manifest_path());
        Self {
            config,
            classes,
            container,
            console,
            store,
        }
    }

    pub fn config(&self) -> &VisConfig {
        &self.config
    }

    pub fn store(&self) -> &ManifestStore {
        &self.store
    }

    /// Entries of the persisted manifest, optionally only the one named `name`
    pub async fn list_manifest_entries(&self, name: Option<&str>) -> Result<Vec<PluginManifestEntry>> {
        let entries = self.store.read_entries()?;
        Ok(match name {
            Some(name) => entries.into_iter().filter(|e| e.name == name).collect(),
            None => entries,
        })
    }

    /// Build entries for every plugin directory that declares a plugin class
    pub async fn discover_from_disk(&self) -> Result<Vec<PluginManifestEntry>> {
        let plugins_dir = self.config.plugins_path();
        let read_dir = match tokio::fs::read_dir(&plugins_dir).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Plugins directory {} does not exist", plugins_dir.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(Error::io(e, "read_dir", plugins_dir)),
        };

        let mut names = Vec::new();
        let mut entries = ReadDirStream::new(read_dir);
        while let Some(dir_entry) = entries.next().await {
            let dir_entry = dir_entry.map_err(|e| Error::io(e, "read_dir_entry", plugins_dir.clone()))?;
            let is_dir = dir_entry
                .file_type()
                .await
                .map_err(|e| Error::io(e, "file_type", dir_entry.path()))?
                .is_dir();
            if is_dir {
                names.push(dir_entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        let persisted = self.store.read_entries()?;
        let mut discovered = Vec::new();
        for name in names {
            let active = is_persisted_active(&persisted, &name);
            if let Some(entry) = self.entry_from_descriptor(&name, active).await? {
                discovered.push(entry);
            }
        }
        log::debug!("Discovered {} plugin(s) on disk", discovered.len());
        Ok(discovered)
    }

    /// A fresh entry for the plugin directory `name`.
    ///
    /// `None` when the directory has no descriptor or the descriptor declares
    /// no plugin class. The `active` flag comes from the persisted manifest.
    /// Fails when `name` is not a single directory name.
    pub async fn build_entry_from_disk(&self, name: &str) -> Result<Option<PluginManifestEntry>> {
        validate_plugin_name(name)?;
        let persisted = self.store.read_entries()?;
        let active = is_persisted_active(&persisted, name);
        self.entry_from_descriptor(name, active).await
    }

    /// Mark a plugin active, publish its assets and run its activation hook.
    ///
    /// Returns false when no plugin of that name can be found on disk.
    pub async fn enable(&self, name: &str) -> Result<bool> {
        let Some(mut entry) = self.build_entry_from_disk(name).await? else {
            log::warn!("Cannot enable '{}': no plugin found on disk", name);
            return Ok(false);
        };
        entry.active = true;

        let asset_source = assets::locate_public_assets(&self.plugin_dir(name));
        self.store.upsert(&entry)?;
        if let Some(source) = asset_source {
            assets::mirror_public_assets(&source, &self.config.public_assets_path(name))?;
        }
        self.clear_cache().await;

        self.run_activation_lifecycle(&entry).await?;
        log::info!("Enabled plugin '{}'", name);
        Ok(true)
    }

    /// Mark a plugin inactive and remove its published assets.
    ///
    /// Returns false when no plugin of that name can be found on disk.
    pub async fn disable(&self, name: &str) -> Result<bool> {
        let Some(mut entry) = self.build_entry_from_disk(name).await? else {
            log::warn!("Cannot disable '{}': no plugin found on disk", name);
            return Ok(false);
        };
        entry.active = false;

        self.store.upsert(&entry)?;
        assets::remove_public_assets(&self.config.public_assets_path(name))?;
        self.clear_cache().await;

        log::info!("Disabled plugin '{}'", name);
        Ok(true)
    }

    pub async fn run_activation_lifecycle(&self, entry: &PluginManifestEntry) -> Result<()> {
        self.run_lifecycle(entry, LifecycleHook::Activate).await
    }

    pub async fn run_update_lifecycle(&self, entry: &PluginManifestEntry) -> Result<()> {
        self.run_lifecycle(entry, LifecycleHook::Update).await
    }

    /// Rewrite the manifest from the plugins found on disk.
    ///
    /// Active flags are carried over, plugins whose directory vanished are
    /// dropped. Active plugins then run their update hook.
    pub async fn rebuild_manifest(&self) -> Result<Vec<PluginManifestEntry>> {
        let entries = self.discover_from_disk().await?;
        self.store.write_entries(&entries)?;
        self.clear_cache().await;

        for entry in entries.iter().filter(|entry| entry.active) {
            self.run_update_lifecycle(entry).await?;
        }
        log::info!("Rebuilt plugin manifest with {} entries", entries.len());
        Ok(entries)
    }

    async fn run_lifecycle(&self, entry: &PluginManifestEntry, hook: LifecycleHook) -> Result<()> {
        let Some(class) = entry.class() else {
            return Ok(());
        };
        if !entry.active || !self.classes.contains(class) {
            log::debug!(
                "Skipping {} hook of '{}': inactive or unknown class",
                hook.as_str(),
                entry.display_name()
            );
            return Ok(());
        }

        let args = PluginArgs {
            active: true,
            path: entry.path.clone(),
            project_root: self.config.project_root.clone(),
        };
        let Some(plugin) = self.classes.instantiate(entry.display_name(), class, args)? else {
            return Ok(());
        };

        let context = PluginContext::new(Arc::clone(&self.container), entry.clone());
        let outcome = match hook {
            LifecycleHook::Activate => plugin.activate(&context).await,
            LifecycleHook::Update => plugin.update(&context).await,
        };
        outcome.map_err(|e| {
            PluginSystemError::LifecycleError {
                plugin_id: entry.display_name().to_string(),
                hook: hook.as_str().to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn entry_from_descriptor(&self, name: &str, active: bool) -> Result<Option<PluginManifestEntry>> {
        let descriptor_path = self.plugin_dir(name).join(constants::DESCRIPTOR_FILE_NAME);
        let content = match tokio::fs::read_to_string(&descriptor_path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("Skipping '{}': no {}", name, constants::DESCRIPTOR_FILE_NAME);
                return Ok(None);
            }
            Err(e) => return Err(Error::io(e, "read_descriptor", descriptor_path)),
        };

        let descriptor = PackageDescriptor::parse(&content, &descriptor_path)?;
        let entry = descriptor.to_entry(name, &self.declared_path(name), active);
        if entry.is_none() {
            log::debug!("Skipping '{}': descriptor declares no plugin class", name);
        }
        Ok(entry)
    }

    fn plugin_dir(&self, name: &str) -> PathBuf {
        self.config.plugins_path().join(name)
    }

    /// Plugin root as written to the manifest, relative to the project root
    /// unless the plugins directory is configured absolute
    fn declared_path(&self, name: &str) -> String {
        self.config
            .plugins_dir
            .join(name)
            .to_string_lossy()
            .replace('\\', "/")
    }

    async fn clear_cache(&self) {
        if let Some(command) = self.config.cache_clear_command.as_deref() {
            self.console.execute_console_command(command).await;
        }
    }
}

/// A plugin name must name exactly one entry of the plugins directory
fn validate_plugin_name(name: &str) -> std::result::Result<(), StorageSystemError> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if single_normal && !name.contains(['/', '\\']) {
        Ok(())
    } else {
        Err(StorageSystemError::InvalidPath {
            path: PathBuf::from(name),
            reason: "plugin name must be a single directory name".to_string(),
        })
    }
}

fn is_persisted_active(persisted: &[PluginManifestEntry], name: &str) -> bool {
    persisted
        .iter()
        .find(|entry| entry.name == name)
        .is_some_and(|entry| entry.active)
}

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
#[cfg(feature = "yaml-config")]
use serde_yaml;
#[cfg(feature = "toml-config")]
use toml;

use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;

/// Supported configuration file formats
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| match ext.to_lowercase().as_str() {
                "json" => Some(ConfigFormat::Json),
                #[cfg(feature = "yaml-config")]
                "yaml" | "yml" => Some(ConfigFormat::Yaml),
                #[cfg(feature = "toml-config")]
                "toml" => Some(ConfigFormat::Toml),
                _ => None,
            })
    }
}

/// Settings of the namespace module loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleLoaderSettings {
    /// Extension of plugin source files, without the dot
    pub extension: String,
    /// Closed class-map mode: only pre-generated class maps resolve types
    pub authoritative: bool,
}

impl Default for ModuleLoaderSettings {
    fn default() -> Self {
        Self {
            extension: constants::DEFAULT_SOURCE_EXTENSION.to_string(),
            authoritative: false,
        }
    }
}

/// Settings consumed by the navigation composer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationSettings {
    /// Locales the application is served in
    pub locales: Vec<String>,
    /// Synthesize a dark mode toggle in the end topbar bucket
    pub darkmode_toggle: bool,
    /// Synthesize a locale switcher in the end topbar bucket
    pub locale_switcher: bool,
}

impl Default for NavigationSettings {
    fn default() -> Self {
        Self {
            locales: vec!["en".to_string()],
            darkmode_toggle: true,
            locale_switcher: true,
        }
    }
}

/// Project configuration of the plugin kernel.
///
/// Every relative path resolves against `project_root`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisConfig {
    pub project_root: PathBuf,
    pub plugins_dir: PathBuf,
    /// Manifest file name, relative to `plugins_dir`
    pub manifest_file: PathBuf,
    pub public_dir: PathBuf,
    /// Shell command invalidating the host's caches, if any
    pub cache_clear_command: Option<String>,
    pub module_loader: ModuleLoaderSettings,
    pub navigation: NavigationSettings,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            plugins_dir: PathBuf::from(constants::DEFAULT_PLUGINS_DIR),
            manifest_file: PathBuf::from(constants::MANIFEST_FILE_NAME),
            public_dir: PathBuf::from(constants::DEFAULT_PUBLIC_DIR),
            cache_clear_command: None,
            module_loader: ModuleLoaderSettings::default(),
            navigation: NavigationSettings::default(),
        }
    }
}

impl VisConfig {
    /// Default configuration rooted at `project_root`
    pub fn for_project(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Self::default()
        }
    }

    /// Load a configuration file, picking the format from its extension.
    ///
    /// A relative `project_root` inside the file resolves against the
    /// directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(e, "read_config", path.to_path_buf()))?;
        let mut config = Self::deserialize(&content, format)?;

        if config.project_root.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.project_root = base.join(&config.project_root);
        }
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize to string based on format
    pub fn serialize(&self, format: ConfigFormat) -> Result<String> {
        let serialized = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(boxed),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::to_string(self).map_err(boxed),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(boxed),
        };
        serialized.map_err(|source| {
            StorageSystemError::SerializationError {
                format: format.extension().to_string(),
                source,
            }
            .into()
        })
    }

    /// Deserialize from string based on format
    pub fn deserialize(data: &str, format: ConfigFormat) -> Result<Self> {
        let parsed = match format {
            ConfigFormat::Json => serde_json::from_str(data).map_err(boxed),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data).map_err(boxed),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data).map_err(boxed),
        };
        parsed.map_err(|source| {
            StorageSystemError::DeserializationError {
                format: format.extension().to_string(),
                source,
            }
            .into()
        })
    }

    /// Resolve a path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    /// Absolute plugins directory
    pub fn plugins_path(&self) -> PathBuf {
        self.resolve(&self.plugins_dir)
    }

    /// Absolute path of the persisted manifest
    pub fn manifest_path(&self) -> PathBuf {
        if self.manifest_file.is_absolute() {
            self.manifest_file.clone()
        } else {
            self.plugins_path().join(&self.manifest_file)
        }
    }

    /// Absolute public directory
    pub fn public_path(&self) -> PathBuf {
        self.resolve(&self.public_dir)
    }

    /// Public directory receiving the mirrored assets of one plugin
    pub fn public_assets_path(&self, plugin_name: &str) -> PathBuf {
        self.public_path()
            .join(constants::PUBLIC_PLUGINS_DIR)
            .join(plugin_name)
    }
}

fn boxed<E>(err: E) -> Box<dyn std::error::Error + Send + Sync>
where
    E: std::error::Error + Send + Sync + 'static,
{
    Box::new(err)
}

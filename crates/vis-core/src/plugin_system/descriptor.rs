use std::path::Path;

use semver::Version;
use serde::Deserialize;
use serde_json::Value;

use crate::kernel::constants;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::{Autoload, PluginManifestEntry};

/// The package descriptor found at a plugin's root
#[derive(Deserialize, Debug, Clone, Default)]
pub struct PackageDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub autoload: Option<Autoload>,
    #[serde(default)]
    pub extra: serde_json::Map<String, Value>,
}

impl PackageDescriptor {
    /// Parse descriptor JSON
    pub fn parse(content: &str, path: &Path) -> Result<Self, PluginSystemError> {
        serde_json::from_str(content).map_err(|e| PluginSystemError::descriptor(path, e))
    }

    /// Declared plugin class, if any
    pub fn plugin_class(&self) -> Option<&str> {
        self.extra_str(constants::PLUGIN_CLASS_KEY)
            .filter(|class| !class.trim().is_empty())
    }

    pub fn label(&self) -> Option<&str> {
        self.extra_str("label")
    }

    /// `extra.description`, falling back to the top-level description
    pub fn description(&self) -> Option<&str> {
        self.extra_str("description").or(self.description.as_deref())
    }

    /// The declared version, if it is valid semver
    pub fn version(&self) -> Option<Version> {
        let raw = self.version.as_deref()?;
        match Version::parse(raw) {
            Ok(version) => Some(version),
            Err(e) => {
                log::warn!("Ignoring invalid plugin version '{}': {}", raw, e);
                None
            }
        }
    }

    /// Build a manifest entry for the plugin directory `name`.
    ///
    /// Returns `None` when no plugin class is declared.
    pub fn to_entry(&self, name: &str, path: &str, active: bool) -> Option<PluginManifestEntry> {
        let class = self.plugin_class()?;
        Some(PluginManifestEntry {
            name: name.to_string(),
            base_class: Some(class.to_string()),
            path: path.to_string(),
            active,
            autoload: self.autoload.clone(),
            label: self.label().map(str::to_string),
            description: self.description().map(str::to_string),
            version: self.version().map(|v| v.to_string()),
            extra: Some(self.extra.clone()),
        })
    }

    fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

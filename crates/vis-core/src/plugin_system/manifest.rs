use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::plugin_system::error::PluginSystemError;

/// Namespace mapping strategies understood by the module loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MappingStrategy {
    /// The prefix is stripped before the type path is looked up in a directory
    Prefix,
    /// The full type path, prefix included, is looked up in a directory
    LegacyPrefix,
}

impl MappingStrategy {
    /// Key of the strategy inside an `autoload` object
    pub fn key(&self) -> &'static str {
        match self {
            MappingStrategy::Prefix => "prefix",
            MappingStrategy::LegacyPrefix => "legacy-prefix",
        }
    }
}

/// One or more source directories of a namespace prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceDirs {
    One(String),
    Many(Vec<String>),
}

impl SourceDirs {
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            SourceDirs::One(dir) => vec![dir.clone()],
            SourceDirs::Many(dirs) => dirs.clone(),
        }
    }
}

/// Namespace mappings of a plugin, keyed by strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Autoload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<BTreeMap<String, SourceDirs>>,

    #[serde(rename = "legacy-prefix", default, skip_serializing_if = "Option::is_none")]
    pub legacy_prefix: Option<BTreeMap<String, SourceDirs>>,
}

impl Autoload {
    /// Mappings grouped by strategy, prefix strategy first
    pub fn strategies(&self) -> Vec<(MappingStrategy, &BTreeMap<String, SourceDirs>)> {
        let mut result = Vec::new();
        if let Some(map) = &self.prefix {
            result.push((MappingStrategy::Prefix, map));
        }
        if let Some(map) = &self.legacy_prefix {
            result.push((MappingStrategy::LegacyPrefix, map));
        }
        result
    }

    /// Whether at least one supported strategy is declared
    pub fn has_strategy(&self) -> bool {
        self.prefix.is_some() || self.legacy_prefix.is_some()
    }
}

/// A persisted record describing one discoverable plugin
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifestEntry {
    /// Unique key of the entry
    #[serde(default)]
    pub name: String,

    /// Class name the plugin constructor is registered under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_class: Option<String>,

    /// Plugin root, relative to the project root or absolute
    #[serde(default)]
    pub path: String,

    #[serde(default)]
    pub active: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoload: Option<Autoload>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Map<String, Value>>,
}

impl PluginManifestEntry {
    /// Create a new, inactive entry
    pub fn new(name: &str, base_class: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            base_class: Some(base_class.to_string()),
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Name used in error messages: the entry name, else its class
    pub fn display_name(&self) -> &str {
        if !self.name.is_empty() {
            return &self.name;
        }
        match self.base_class.as_deref() {
            Some(class) if !class.is_empty() => class,
            _ => "<unknown>",
        }
    }

    /// The class name if it is usable for instantiation
    pub fn class(&self) -> Option<&str> {
        self.base_class.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Add a namespace mapping
    pub fn with_mapping(mut self, strategy: MappingStrategy, prefix: &str, dirs: &[&str]) -> Self {
        let autoload = self.autoload.get_or_insert_with(Autoload::default);
        let slot = match strategy {
            MappingStrategy::Prefix => &mut autoload.prefix,
            MappingStrategy::LegacyPrefix => &mut autoload.legacy_prefix,
        };
        let dirs = match dirs {
            [single] => SourceDirs::One(single.to_string()),
            many => SourceDirs::Many(many.iter().map(|d| d.to_string()).collect()),
        };
        slot.get_or_insert_with(BTreeMap::new).insert(prefix.to_string(), dirs);
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Raw JSON form handed to lifecycle hooks
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parse a persisted manifest.
    ///
    /// The document must be a JSON array. Records that are not objects, or
    /// objects that do not form an entry, are skipped.
    pub fn parse_list(content: &str, path: &Path) -> Result<Vec<Self>, PluginSystemError> {
        let records: Vec<Value> =
            serde_json::from_str(content).map_err(|e| PluginSystemError::manifest(path, e))?;
        Ok(Self::from_records(records))
    }

    /// Keep the records forming valid entries, in order
    pub fn from_records(records: Vec<Value>) -> Vec<Self> {
        records
            .into_iter()
            .enumerate()
            .filter_map(|(index, record)| {
                if !record.is_object() {
                    log::debug!("Skipping manifest record #{} which is not an object", index);
                    return None;
                }
                match serde_json::from_value::<Self>(record) {
                    Ok(entry) => Some(entry),
                    Err(e) => {
                        log::warn!("Skipping malformed manifest record #{}: {}", index, e);
                        None
                    }
                }
            })
            .collect()
    }
}

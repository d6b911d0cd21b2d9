//! # Vis Core Plugin System Errors
//!
//! Defines [`PluginLoadError`], the fatal bootstrap failures that abort plugin
//! loading, and [`PluginSystemError`], the wider set of plugin system errors
//! covering manifest and descriptor parsing, lifecycle hooks and misuse of
//! the loader state machine.
use std::path::PathBuf;

/// Fatal failures of the plugin bootstrap.
///
/// Any of these leaves the registry unusable; the host must not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginLoadError {
    #[error("Plugin '{plugin}' has no autoload property in its manifest entry")]
    AutoloadMissing { plugin: String },

    #[error("Plugin '{plugin}' declares neither a prefix nor a legacy-prefix namespace mapping")]
    MappingStrategyMissing { plugin: String },

    #[error("Plugin '{plugin}' root '{}' is outside the project root '{}'", root.display(), project_root.display())]
    PathOutsideProject {
        plugin: String,
        root: PathBuf,
        project_root: PathBuf,
    },

    #[error("Plugin '{plugin}' class '{class}' must implement KernelPlugin")]
    BaseTypeMismatch { plugin: String, class: String },
}

#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error(transparent)]
    Load(#[from] PluginLoadError),

    #[error("Plugin manifest error for '{}': {message}", path.display())]
    ManifestError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Plugin descriptor error for '{}': {message}", path.display())]
    DescriptorError {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Lifecycle hook '{hook}' failed for plugin '{plugin_id}': {message}")]
    LifecycleError {
        plugin_id: String,
        hook: String,
        message: String,
    },

    #[error("Plugin loader is in state {state:?}, expected {expected:?}")]
    InvalidState {
        state: crate::plugin_system::loader::LoaderState,
        expected: crate::plugin_system::loader::LoaderState,
    },
}

impl PluginSystemError {
    pub(crate) fn manifest(path: &std::path::Path, err: serde_json::Error) -> Self {
        PluginSystemError::ManifestError {
            path: path.to_path_buf(),
            message: format!("Failed to parse manifest JSON: {}", err),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn descriptor(path: &std::path::Path, err: serde_json::Error) -> Self {
        PluginSystemError::DescriptorError {
            path: path.to_path_buf(),
            message: format!("Failed to parse descriptor JSON: {}", err),
            source: Some(Box::new(err)),
        }
    }
}

//! Mapping of plugin-declared source directories onto the project tree.
use std::path::{Path, PathBuf};

use crate::plugin_system::error::PluginLoadError;
use crate::utils::normalize_lexically;

/// Resolve a declared plugin root against the project root.
///
/// Absolute roots pass through unchanged, relative ones are joined.
pub fn resolve_absolute_root(project_root: &Path, declared_root: &str) -> PathBuf {
    let declared = Path::new(declared_root);
    if declared.is_absolute() {
        declared.to_path_buf()
    } else {
        project_root.join(declared)
    }
}

/// Resolve each relative source directory of a plugin to an absolute path.
///
/// Fails with [`PluginLoadError::PathOutsideProject`] when the plugin root
/// or any of the resolved directories does not lie inside `project_root`.
pub fn map_source_directories(
    plugin_name: &str,
    relative_dirs: &[String],
    project_root: &Path,
    declared_root: &str,
) -> Result<Vec<PathBuf>, PluginLoadError> {
    let project = normalize_lexically(project_root);
    let root = normalize_lexically(&resolve_absolute_root(project_root, declared_root));

    if !root.starts_with(&project) {
        return Err(PluginLoadError::PathOutsideProject {
            plugin: plugin_name.to_string(),
            root,
            project_root: project,
        });
    }

    relative_dirs
        .iter()
        .map(|dir| {
            // An absolute dir replaces the root on join and is checked the same way
            let resolved = normalize_lexically(&root.join(dir));
            if resolved.starts_with(&project) {
                Ok(resolved)
            } else {
                Err(PluginLoadError::PathOutsideProject {
                    plugin: plugin_name.to_string(),
                    root: resolved,
                    project_root: project.clone(),
                })
            }
        })
        .collect()
}

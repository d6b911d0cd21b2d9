//! Static asset mirroring between plugin directories and the public tree.
use std::path::{Path, PathBuf};

use crate::kernel::constants;
use crate::kernel::error::{Error, Result};
use crate::utils::{mirror_dir, remove_dir_if_exists};

/// The first existing public asset directory inside a plugin
pub fn locate_public_assets(plugin_dir: &Path) -> Option<PathBuf> {
    constants::PLUGIN_ASSET_DIRS
        .iter()
        .map(|dir| plugin_dir.join(dir))
        .find(|dir| dir.is_dir())
}

/// Mirror `source` into `target`, deleting files no longer in `source`
pub fn mirror_public_assets(source: &Path, target: &Path) -> Result<()> {
    mirror_dir(source, target).map_err(|e| Error::io(e, "mirror_assets", target.to_path_buf()))?;
    log::info!("Mirrored assets {} -> {}", source.display(), target.display());
    Ok(())
}

/// Remove a mirrored asset directory. Returns whether anything was removed.
pub fn remove_public_assets(target: &Path) -> Result<bool> {
    let removed =
        remove_dir_if_exists(target).map_err(|e| Error::io(e, "remove_assets", target.to_path_buf()))?;
    if removed {
        log::info!("Removed mirrored assets at {}", target.display());
    }
    Ok(removed)
}

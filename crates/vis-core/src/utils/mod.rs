//! Filesystem helpers shared by the plugin system and storage layers.
pub mod fs;

pub use fs::{find_files, find_files_with_extension, mirror_dir, normalize_lexically, remove_dir_if_exists};

#[cfg(test)]
mod tests;

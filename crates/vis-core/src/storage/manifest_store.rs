use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tempfile::NamedTempFile;

use crate::kernel::error::{Error, Result};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manifest::PluginManifestEntry;
use crate::storage::error::StorageSystemError;

/// The persisted plugin manifest: a pretty-printed JSON array of entries.
///
/// Writes replace the file atomically. Concurrent writers are not
/// serialized; the last rename wins.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Raw records of the manifest. An absent file reads as empty.
    pub fn read_records(&self) -> Result<Vec<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io(e, "read_manifest", self.path.clone())),
        };
        serde_json::from_str(&content)
            .map_err(|e| PluginSystemError::manifest(&self.path, e).into())
    }

    /// Entries of the manifest, skipping records that do not form one
    pub fn read_entries(&self) -> Result<Vec<PluginManifestEntry>> {
        Ok(PluginManifestEntry::from_records(self.read_records()?))
    }

    /// Replace the record named like `entry`, or append it.
    ///
    /// Records this crate cannot parse are kept as they are.
    pub fn upsert(&self, entry: &PluginManifestEntry) -> Result<()> {
        let mut records = self.read_records()?;
        let value = serde_json::to_value(entry).map_err(serialization_error)?;

        let existing = records.iter_mut().find(|record| {
            record.get("name").and_then(Value::as_str) == Some(entry.name.as_str())
        });
        match existing {
            Some(record) => *record = value,
            None => records.push(value),
        }

        self.write_records(&records)
    }

    /// Overwrite the manifest with `entries`
    pub fn write_entries(&self, entries: &[PluginManifestEntry]) -> Result<()> {
        let records = entries
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(serialization_error)?;
        self.write_records(&records)
    }

    fn write_records(&self, records: &[Value]) -> Result<()> {
        let mut contents = serde_json::to_string_pretty(records).map_err(serialization_error)?;
        contents.push('\n');

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| Error::io(e, "create_dir_all", parent.clone()))?;

        // Write to a sibling temp file and rename it over the manifest
        let mut temp_file = NamedTempFile::new_in(&parent)
            .map_err(|e| Error::io(e, "create_temp_file", parent.clone()))?;
        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| Error::io(e, "write_to_temp_file", temp_file.path().to_path_buf()))?;
        temp_file
            .persist(&self.path)
            .map_err(|e| Error::io(e.error, "persist_temp_file", self.path.clone()))?;

        log::debug!("Wrote {} manifest record(s) to {}", records.len(), self.path.display());
        Ok(())
    }
}

fn serialization_error(err: serde_json::Error) -> Error {
    StorageSystemError::SerializationError {
        format: "json".to_string(),
        source: Box::new(err),
    }
    .into()
}

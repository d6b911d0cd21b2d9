//! Namespace based resolution of plugin type names to source files.
//!
//! Type names are `::` separated paths such as `Vis::Dashboard::DashboardPlugin`.
//! A namespace mapping ties a prefix of such paths to source directories:
//!
//! - with [`MappingStrategy::Prefix`] the prefix is stripped, so the type
//!   above mapped from `Vis::Dashboard` to `src` lives in
//!   `src/dashboard_plugin.rs`;
//! - with [`MappingStrategy::LegacyPrefix`] the whole path is kept, giving
//!   `src/Vis/Dashboard/dashboard_plugin.rs`.
//!
//! The last segment names the file in snake case, the segments in between
//! name directories verbatim.
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::kernel::constants;
use crate::plugin_system::manifest::MappingStrategy;
use crate::utils::find_files_with_extension;

/// Type name → defining file
pub type ClassMap = BTreeMap<String, PathBuf>;

/// Separator between the segments of a type name
pub const SEGMENT_SEPARATOR: &str = "::";

/// The module loader the plugin kernel registers namespaces with
pub trait ModuleLoader: Send + Sync + Debug {
    /// Register source directories for a namespace prefix
    fn add_namespace(&mut self, prefix: &str, dirs: Vec<PathBuf>, strategy: MappingStrategy);

    /// The file defining `class`, if it can be located
    fn resolve_type_file(&self, class: &str) -> Option<PathBuf>;

    /// In closed class-map mode only registered class maps resolve types
    fn is_class_map_authoritative(&self) -> bool;

    fn add_class_map(&mut self, map: ClassMap);

    /// Extension of source files, without the dot
    fn source_extension(&self) -> &str {
        constants::DEFAULT_SOURCE_EXTENSION
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NamespaceMapping {
    prefix: String,
    dirs: Vec<PathBuf>,
    strategy: MappingStrategy,
}

/// Module loader resolving types through namespace mappings and class maps
#[derive(Debug, Clone)]
pub struct NamespaceLoader {
    extension: String,
    authoritative: bool,
    namespaces: Vec<NamespaceMapping>,
    class_map: ClassMap,
}

impl Default for NamespaceLoader {
    fn default() -> Self {
        Self::new(constants::DEFAULT_SOURCE_EXTENSION, false)
    }
}

impl NamespaceLoader {
    pub fn new(extension: &str, authoritative: bool) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            authoritative,
            namespaces: Vec::new(),
            class_map: ClassMap::new(),
        }
    }

    /// Registered prefixes with their strategy, in registration order
    pub fn prefixes(&self) -> Vec<(String, MappingStrategy)> {
        self.namespaces
            .iter()
            .map(|ns| (ns.prefix.clone(), ns.strategy))
            .collect()
    }

    /// Directories registered for a prefix across all strategies
    pub fn dirs_for(&self, prefix: &str) -> Vec<PathBuf> {
        let prefix = normalize_prefix(prefix);
        self.namespaces
            .iter()
            .filter(|ns| ns.prefix == prefix)
            .flat_map(|ns| ns.dirs.iter().cloned())
            .collect()
    }

    pub fn class_map(&self) -> &ClassMap {
        &self.class_map
    }

    fn resolve_from_namespaces(&self, class: &str) -> Option<PathBuf> {
        let mut candidates: Vec<&NamespaceMapping> = self
            .namespaces
            .iter()
            .filter(|ns| matches_prefix(class, &ns.prefix))
            .collect();
        // Most specific prefix first
        candidates.sort_by(|a, b| b.prefix.len().cmp(&a.prefix.len()));

        for ns in candidates {
            let relative = match ns.strategy {
                MappingStrategy::Prefix => strip_prefix(class, &ns.prefix),
                MappingStrategy::LegacyPrefix => Some(class),
            };
            let Some(relative) = relative else { continue };
            let Some(file) = type_file_path(relative, &self.extension) else {
                continue;
            };
            for dir in &ns.dirs {
                let candidate = dir.join(&file);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl ModuleLoader for NamespaceLoader {
    fn add_namespace(&mut self, prefix: &str, dirs: Vec<PathBuf>, strategy: MappingStrategy) {
        let prefix = normalize_prefix(prefix);
        log::debug!("Registering {} namespace '{}' -> {:?}", strategy.key(), prefix, dirs);
        match self
            .namespaces
            .iter_mut()
            .find(|ns| ns.prefix == prefix && ns.strategy == strategy)
        {
            Some(existing) => {
                for dir in dirs {
                    if !existing.dirs.contains(&dir) {
                        existing.dirs.push(dir);
                    }
                }
            }
            None => self.namespaces.push(NamespaceMapping {
                prefix,
                dirs,
                strategy,
            }),
        }
    }

    fn resolve_type_file(&self, class: &str) -> Option<PathBuf> {
        if let Some(file) = self.class_map.get(class) {
            return Some(file.clone());
        }
        if self.authoritative {
            return None;
        }
        self.resolve_from_namespaces(class)
    }

    fn is_class_map_authoritative(&self) -> bool {
        self.authoritative
    }

    fn add_class_map(&mut self, map: ClassMap) {
        for (class, file) in map {
            // First definition of a class wins
            self.class_map.entry(class).or_insert(file);
        }
    }

    fn source_extension(&self) -> &str {
        &self.extension
    }
}

/// Scan `dir` for type declarations and map them to their files.
///
/// Public `struct`, `enum` and `trait` items are collected. The type name is
/// built from the directories between `dir` and the file plus the item name,
/// preceded by `prefix` when the prefix strategy is used. A missing `dir`
/// yields an empty map.
pub fn generate_class_map(
    dir: &Path,
    prefix: &str,
    strategy: MappingStrategy,
    extension: &str,
) -> io::Result<ClassMap> {
    let mut map = ClassMap::new();
    let prefix = normalize_prefix(prefix);

    for file in find_files_with_extension(dir, extension)? {
        let Ok(relative) = file.strip_prefix(dir) else {
            continue;
        };
        let mut segments: Vec<String> = Vec::new();
        if strategy == MappingStrategy::Prefix && !prefix.is_empty() {
            segments.push(prefix.clone());
        }
        if let Some(parent) = relative.parent() {
            segments.extend(
                parent
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned()),
            );
        }

        let content = fs::read_to_string(&file)?;
        for name in declared_types(&content) {
            let mut class = segments.clone();
            class.push(name);
            map.entry(class.join(SEGMENT_SEPARATOR)).or_insert_with(|| file.clone());
        }
    }

    Ok(map)
}

/// Names of public types declared at the start of a line
fn declared_types(content: &str) -> Vec<String> {
    const KEYWORDS: [&str; 3] = ["pub struct ", "pub enum ", "pub trait "];

    content
        .lines()
        .map(str::trim_start)
        .filter_map(|line| {
            KEYWORDS
                .iter()
                .find_map(|keyword| line.strip_prefix(*keyword))
        })
        .filter_map(|rest| {
            let name: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '_')
                .collect();
            (!name.is_empty()).then_some(name)
        })
        .collect()
}

/// Relative file of a type path: directories verbatim, file name in snake case
pub fn type_file_path(type_path: &str, extension: &str) -> Option<PathBuf> {
    let segments: Vec<&str> = type_path
        .split(SEGMENT_SEPARATOR)
        .filter(|s| !s.is_empty())
        .collect();
    let (last, dirs) = segments.split_last()?;

    let mut path: PathBuf = dirs.iter().collect();
    path.push(format!("{}.{}", to_snake_case(last), extension));
    Some(path)
}

/// `DashboardPlugin` → `dashboard_plugin`, `HTTPClient` → `http_client`
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(char::is_lowercase),
                _ => false,
            };
            if boundary && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_end_matches(SEGMENT_SEPARATOR).to_string()
}

fn matches_prefix(class: &str, prefix: &str) -> bool {
    prefix.is_empty() || strip_prefix(class, prefix).is_some()
}

fn strip_prefix<'a>(class: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return Some(class);
    }
    class
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix(SEGMENT_SEPARATOR))
        .filter(|rest| !rest.is_empty())
}

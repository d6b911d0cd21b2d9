use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Find files recursively in a directory that match a predicate
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();

    if !path.as_ref().exists() {
        return Ok(result);
    }

    if path.as_ref().is_file() {
        if predicate(path.as_ref()) {
            result.push(path.as_ref().to_path_buf());
        }
        return Ok(result);
    }

    let mut entries = fs::read_dir(path)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()?;
    // Deterministic order for class maps and mirroring
    entries.sort();

    for entry_path in entries {
        if entry_path.is_file() {
            if predicate(&entry_path) {
                result.push(entry_path);
            }
        } else if entry_path.is_dir() {
            let mut sub_results = find_files(&entry_path, predicate)?;
            result.append(&mut sub_results);
        }
    }

    Ok(result)
}

/// Find files with a specific extension
pub fn find_files_with_extension<P: AsRef<Path>>(path: P, extension: &str) -> io::Result<Vec<PathBuf>> {
    let extension_lower = extension.to_lowercase();
    find_files(path, &move |p: &Path| match p.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase() == extension_lower,
        None => false,
    })
}

/// Fold `.` and `..` components without touching the filesystem.
///
/// `..` above the root of an absolute path is dropped, above the start of a
/// relative path it is kept.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }
    parts.iter().map(|c| c.as_os_str()).collect()
}

/// Mirror `source` into `target`.
///
/// Afterwards `target` holds exactly the files and directories of `source`:
/// missing ones are copied, existing files overwritten and entries absent from
/// `source` deleted.
pub fn mirror_dir(source: &Path, target: &Path) -> io::Result<()> {
    if target.is_file() {
        fs::remove_file(target)?;
    }
    fs::create_dir_all(target)?;

    let mut seen: HashSet<OsString> = HashSet::new();
    for entry in fs::read_dir(source)? {
        let entry = entry?;
        let name = entry.file_name();
        let from = entry.path();
        let to = target.join(&name);

        if from.is_dir() {
            mirror_dir(&from, &to)?;
        } else {
            if to.is_dir() {
                fs::remove_dir_all(&to)?;
            }
            fs::copy(&from, &to)?;
        }
        seen.insert(name);
    }

    for entry in fs::read_dir(target)? {
        let entry = entry?;
        if seen.contains(&entry.file_name()) {
            continue;
        }
        let stale = entry.path();
        if stale.is_dir() {
            fs::remove_dir_all(&stale)?;
        } else {
            fs::remove_file(&stale)?;
        }
    }

    Ok(())
}

/// Remove a directory tree, treating an absent directory as removed
pub fn remove_dir_if_exists(path: &Path) -> io::Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

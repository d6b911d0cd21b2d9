use std::fs::{self, File};
use std::path::{Path, PathBuf};

use tempfile::tempdir;

use crate::utils::fs::{find_files_with_extension, mirror_dir, normalize_lexically, remove_dir_if_exists};

#[test]
fn test_find_files_with_extension() {
    let temp_dir = tempdir().unwrap();
    let base_path = temp_dir.path();

    let sub1 = base_path.join("sub1");
    let sub1_sub = sub1.join("sub1_sub");
    fs::create_dir_all(&sub1_sub).unwrap();
    fs::create_dir(base_path.join("empty_dir")).unwrap();

    File::create(base_path.join("root.rs")).unwrap();
    File::create(base_path.join("ROOT.RS")).unwrap();
    File::create(base_path.join("root.log")).unwrap();
    File::create(sub1.join("a.rs")).unwrap();
    File::create(sub1_sub.join("b.rs")).unwrap();
    File::create(sub1_sub.join("noext")).unwrap();

    let mut found = find_files_with_extension(base_path, "rs").unwrap();
    found.sort();
    let mut expected = vec![
        base_path.join("ROOT.RS"),
        base_path.join("root.rs"),
        sub1.join("a.rs"),
        sub1_sub.join("b.rs"),
    ];
    expected.sort();
    assert_eq!(found, expected);

    let missing = find_files_with_extension(base_path.join("does_not_exist"), "rs").unwrap();
    assert!(missing.is_empty());
}

#[test]
fn test_normalize_lexically() {
    assert_eq!(normalize_lexically(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
    assert_eq!(normalize_lexically(Path::new("/a/./b/.")), PathBuf::from("/a/b"));
    assert_eq!(normalize_lexically(Path::new("/a/../../b")), PathBuf::from("/b"));
    assert_eq!(normalize_lexically(Path::new("a/../../b")), PathBuf::from("../b"));
    assert_eq!(normalize_lexically(Path::new("/project/plugins/../../etc")), PathBuf::from("/etc"));
}

#[test]
fn test_mirror_dir_copies_and_prunes() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("source");
    let target = temp_dir.path().join("target");

    fs::create_dir_all(source.join("css")).unwrap();
    fs::write(source.join("app.js"), "console.log(1);").unwrap();
    fs::write(source.join("css/site.css"), "body {}").unwrap();

    fs::create_dir_all(target.join("old_dir")).unwrap();
    fs::write(target.join("stale.txt"), "stale").unwrap();
    fs::write(target.join("old_dir/inner.txt"), "stale").unwrap();
    fs::write(target.join("app.js"), "outdated").unwrap();

    mirror_dir(&source, &target).unwrap();

    assert_eq!(fs::read_to_string(target.join("app.js")).unwrap(), "console.log(1);");
    assert_eq!(fs::read_to_string(target.join("css/site.css")).unwrap(), "body {}");
    assert!(!target.join("stale.txt").exists());
    assert!(!target.join("old_dir").exists());
}

#[test]
fn test_mirror_dir_creates_target() {
    let temp_dir = tempdir().unwrap();
    let source = temp_dir.path().join("source");
    fs::create_dir_all(&source).unwrap();
    fs::write(source.join("logo.svg"), "<svg/>").unwrap();

    let target = temp_dir.path().join("public/plugins/Foo");
    mirror_dir(&source, &target).unwrap();
    assert!(target.join("logo.svg").is_file());
}

#[test]
fn test_remove_dir_if_exists() {
    let temp_dir = tempdir().unwrap();
    let dir = temp_dir.path().join("gone");
    fs::create_dir_all(dir.join("nested")).unwrap();

    assert!(remove_dir_if_exists(&dir).unwrap());
    assert!(!dir.exists());
    assert!(!remove_dir_if_exists(&dir).unwrap());
}

use ccdupe::actions::{delete_file, DeleteConfig, DeleteError};
use ccdupe::error::ErrorKind;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_permanent_delete_removes_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dup.txt");
    fs::write(&file, b"12345").unwrap();

    let result = delete_file(&file, &DeleteConfig::permanent()).unwrap();

    assert!(!file.exists());
    assert_eq!(result.size, 5);
    assert!(result.permanent);
}

#[test]
fn test_externally_removed_file_is_not_found() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dup.txt");
    fs::write(&file, b"x").unwrap();
    fs::remove_file(&file).unwrap();

    let err = delete_file(&file, &DeleteConfig::default()).unwrap_err();

    assert!(matches!(err, DeleteError::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.path(), file.as_path());
}

#[test]
fn test_directory_is_refused() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();

    let err = delete_file(&sub, &DeleteConfig::default()).unwrap_err();

    assert!(matches!(err, DeleteError::NotAFile(_)));
    assert!(sub.exists());
}

#[cfg(unix)]
#[test]
fn test_link_removed_not_target() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    let link = dir.path().join("link");
    fs::write(&target, b"keep me").unwrap();
    std::os::unix::fs::symlink(&target, &link).unwrap();

    delete_file(&link, &DeleteConfig::permanent()).unwrap();

    assert!(fs::symlink_metadata(&link).is_err());
    assert_eq!(fs::read(&target).unwrap(), b"keep me");
}

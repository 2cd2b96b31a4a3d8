use ccdupe::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use ccdupe::output::JsonOutput;
use ccdupe::scanner::{ScanConfig, ScanError};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

fn finder_with(config: ScanConfig) -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_scan_config(config))
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let result = finder.find_duplicates(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.total_files, 0);
    assert_eq!(result.total_duplicates(), 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.total_files, 3);
    assert_eq!(result.stats.duplicate_groups, 0);
}

#[test]
fn test_scan_pair_and_unique() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    write(&dir.path().join("c.txt"), b"world");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].paths,
        vec![dir.path().join("a.txt"), dir.path().join("b.txt")]
    );
    assert_eq!(result.total_files, 3);
    assert_eq!(result.total_duplicates(), 2);
    assert_eq!(result.stats.reclaimable_space, 5);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let deep = dir.path().join("one").join("two");
    fs::create_dir_all(&deep).unwrap();
    write(&dir.path().join("top.bin"), b"same bytes");
    write(&deep.join("bottom.bin"), b"same bytes");
    write(&dir.path().join("one").join("middle.bin"), b"same bytes");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 3);
    assert_eq!(result.groups[0].duplicate_count(), 2);
}

#[test]
fn test_scan_multiple_groups_sorted_by_first_path() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("z1.txt"), b"zzz");
    write(&dir.path().join("z2.txt"), b"zzz");
    write(&dir.path().join("a1.txt"), b"aaa");
    write(&dir.path().join("a2.txt"), b"aaa");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.groups.len(), 2);
    assert_eq!(result.groups[0].paths[0], dir.path().join("a1.txt"));
    assert_eq!(result.groups[1].paths[0], dir.path().join("z1.txt"));
}

#[test]
fn test_min_size_threshold_is_inclusive() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"1234");
    write(&dir.path().join("small2"), b"1234");
    write(&dir.path().join("exact1"), b"12345");
    write(&dir.path().join("exact2"), b"12345");

    let result = finder_with(ScanConfig::default().with_min_size(5))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].paths,
        vec![dir.path().join("exact1"), dir.path().join("exact2")]
    );
    assert_eq!(result.total_files, 2);
}

#[test]
fn test_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].size, 0);
}

#[test]
fn test_sequential_and_pooled_agree() {
    let dir = tempdir().unwrap();
    for i in 0..20 {
        write(
            &dir.path().join(format!("f{i:02}")),
            format!("content {}", i % 5).as_bytes(),
        );
    }

    let sequential = finder_with(ScanConfig::default().with_io_threads(1))
        .find_duplicates(dir.path())
        .unwrap();
    let pooled = finder_with(ScanConfig::default().with_io_threads(4))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sequential.groups, pooled.groups);
    assert_eq!(sequential.groups.len(), 5);
}

#[test]
fn test_missing_root_is_fatal() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("gone");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&missing)
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotFound(_))));
}

#[test]
fn test_file_root_is_fatal() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    write(&file, b"x");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&file)
        .unwrap_err();

    assert!(matches!(err, FinderError::Scan(ScanError::NotADirectory(_))));
}

#[test]
fn test_shutdown_flag_interrupts() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"x");

    let flag = Arc::new(AtomicBool::new(true));
    let finder = DuplicateFinder::new(FinderConfig::default().with_shutdown_flag(flag));

    assert!(matches!(
        finder.find_duplicates(dir.path()),
        Err(FinderError::Interrupted)
    ));
}

#[test]
fn test_json_report_shape() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"hello");
    write(&dir.path().join("b.txt"), b"hello");
    write(&dir.path().join("c.txt"), b"world");

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();
    let json = JsonOutput::new(&result).to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["total_files"], 3);
    assert_eq!(value["total_duplicates"], 2);
    let groups = value["duplicate_groups"].as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(groups[0]["hash"].as_str().unwrap().len(), 64);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    write(&dir.path().join("a"), b"data");
    write(&dir.path().join("b"), b"data");
    write(&locked, b"data");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to observe then
    if File::open(&locked).is_ok() {
        return;
    }

    let result = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    assert_eq!(result.total_files, 2);
    assert_eq!(result.stats.hash_failures, 1);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();
}

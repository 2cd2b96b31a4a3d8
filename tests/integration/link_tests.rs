#![cfg(unix)]

use ccdupe::duplicates::{DuplicateFinder, FinderConfig};
use ccdupe::output::json::JsonOutput;
use ccdupe::scanner::{resolve, ResolveError, ScanConfig, Walker, MAX_LINK_HOPS};
use std::fs::{self, File};
use std::io::Write;
use std::os::unix::fs::symlink;
use tempfile::tempdir;

fn finder(follow: bool) -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_scan_config(ScanConfig::default().with_follow_symlinks(follow)),
    )
}

#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = tempdir().unwrap();
    let original = dir.path().join("a.txt");
    File::create(&original)
        .unwrap()
        .write_all(b"content")
        .unwrap();
    symlink(&original, dir.path().join("link.txt")).unwrap();

    let result = finder(false).find_duplicates(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.total_files, 1);
    assert_eq!(result.stats.links_excluded, 1);
}

#[test]
fn test_json_total_files_excludes_unfollowed_links() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    symlink(&a, dir.path().join("link.txt")).unwrap();

    let unfollowed = JsonOutput::new(&finder(false).find_duplicates(dir.path()).unwrap());
    assert_eq!(unfollowed.total_files, 2);
    assert_eq!(unfollowed.total_duplicates, 2);

    let followed = JsonOutput::new(&finder(true).find_duplicates(dir.path()).unwrap());
    assert_eq!(followed.total_files, 3);
    assert_eq!(followed.total_duplicates, 3);
}

#[test]
fn test_followed_link_joins_target_group() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    fs::write(&a, b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();
    let link = dir.path().join("link_to_a");
    symlink(&a, &link).unwrap();

    let result = finder(true).find_duplicates(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(
        result.groups[0].paths,
        vec![a.clone(), dir.path().join("b.txt"), link.clone()]
    );
    assert_eq!(result.groups[0].link_target(&link), Some(a.as_path()));
    assert_eq!(result.groups[0].link_target(&a), None);
    assert_eq!(result.total_files, 4);
}

#[test]
fn test_link_chain_is_followed() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    fs::write(&target, b"payload").unwrap();
    symlink("target", dir.path().join("hop1")).unwrap();
    symlink("hop1", dir.path().join("hop2")).unwrap();

    assert_eq!(resolve(&dir.path().join("hop2")).unwrap(), target);

    let result = finder(true).find_duplicates(dir.path()).unwrap();
    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 3);
}

#[test]
fn test_broken_link_is_skipped() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"x").unwrap();
    fs::write(dir.path().join("b"), b"x").unwrap();
    symlink(dir.path().join("nowhere"), dir.path().join("dangling")).unwrap();

    let result = finder(true).find_duplicates(dir.path()).unwrap();

    assert_eq!(result.groups.len(), 1);
    assert_eq!(result.groups[0].len(), 2);
    assert_eq!(result.stats.skipped_entries, 1);
}

#[test]
fn test_link_cycle_is_skipped() {
    let dir = tempdir().unwrap();
    symlink(dir.path().join("loop_b"), dir.path().join("loop_a")).unwrap();
    symlink(dir.path().join("loop_a"), dir.path().join("loop_b")).unwrap();

    assert!(matches!(
        resolve(&dir.path().join("loop_a")),
        Err(ResolveError::LinkCycle(_))
    ));

    let (records, stats) = Walker::new(
        dir.path(),
        ScanConfig::default().with_follow_symlinks(true),
    )
    .scan()
    .unwrap();
    assert!(records.is_empty());
    assert_eq!(stats.skipped_entries, 2);
}

#[test]
fn test_long_chain_within_hop_limit() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("target");
    fs::write(&target, b"deep").unwrap();

    let mut previous = target.clone();
    for i in 0..MAX_LINK_HOPS {
        let link = dir.path().join(format!("l{i:02}"));
        symlink(&previous, &link).unwrap();
        previous = link;
    }

    assert_eq!(resolve(&previous).unwrap(), target);
}

#[test]
fn test_directory_link_not_descended() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("file"), b"inner").unwrap();
    symlink(&sub, dir.path().join("sub_link")).unwrap();

    let result = finder(true).find_duplicates(dir.path()).unwrap();

    assert!(result.groups.is_empty());
    assert_eq!(result.total_files, 1);
}

use ccdupe::duplicates::{
    identical, verify_bucket, CompareError, Comparator, FingerprintBucket, COMPARE_CHUNK_SIZE,
};
use ccdupe::error::ErrorKind;
use std::fs;
use tempfile::tempdir;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

#[test]
fn test_identical_across_chunk_boundaries() {
    let dir = tempdir().unwrap();
    for len in [
        0,
        1,
        COMPARE_CHUNK_SIZE - 1,
        COMPARE_CHUNK_SIZE,
        COMPARE_CHUNK_SIZE + 1,
        3 * COMPARE_CHUNK_SIZE,
    ] {
        let a = dir.path().join(format!("a{len}"));
        let b = dir.path().join(format!("b{len}"));
        let content = pattern(len);
        fs::write(&a, &content).unwrap();
        fs::write(&b, &content).unwrap();

        assert!(identical(&a, &b).unwrap(), "length {len}");
    }
}

#[test]
fn test_last_byte_difference_detected() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    let content = pattern(2 * COMPARE_CHUNK_SIZE);
    let mut other = content.clone();
    *other.last_mut().unwrap() ^= 0xff;
    fs::write(&a, &content).unwrap();
    fs::write(&b, &other).unwrap();

    assert!(!identical(&a, &b).unwrap());
    assert!(!Comparator::new().with_chunk_size(7).identical(&a, &b).unwrap());
}

#[test]
fn test_prefix_is_not_identical_and_not_error() {
    let dir = tempdir().unwrap();
    let short = dir.path().join("short");
    let long = dir.path().join("long");
    fs::write(&short, pattern(COMPARE_CHUNK_SIZE)).unwrap();
    fs::write(&long, pattern(COMPARE_CHUNK_SIZE + 10)).unwrap();

    assert!(!identical(&short, &long).unwrap());
    assert!(!identical(&long, &short).unwrap());
}

#[test]
fn test_vanished_file_is_an_error() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    fs::write(&a, b"abc").unwrap();

    let err = identical(&a, &dir.path().join("gone")).unwrap_err();
    assert!(matches!(err, CompareError::NotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_forced_collision_splits_bucket() {
    let dir = tempdir().unwrap();
    let paths: Vec<_> = ["x1", "y1", "x2", "y2"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
    fs::write(&paths[0], b"xxxx").unwrap();
    fs::write(&paths[1], b"yyyy").unwrap();
    fs::write(&paths[2], b"xxxx").unwrap();
    fs::write(&paths[3], b"yyyy").unwrap();

    // Same fake fingerprint for all four
    let bucket = FingerprintBucket::new([7u8; 32], 4, paths.clone());
    let (groups, stats) = verify_bucket(&bucket, &Comparator::new());

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].paths, vec![paths[0].clone(), paths[2].clone()]);
    assert_eq!(groups[1].paths, vec![paths[1].clone(), paths[3].clone()]);
    assert_eq!(stats.comparison_errors, 0);
}

#[test]
fn test_vanished_member_does_not_abort_bucket() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let gone = dir.path().join("gone");
    let b = dir.path().join("b");
    fs::write(&a, b"same").unwrap();
    fs::write(&b, b"same").unwrap();

    let bucket = FingerprintBucket::new([1u8; 32], 4, vec![a.clone(), gone, b.clone()]);
    let (groups, stats) = verify_bucket(&bucket, &Comparator::new());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].paths, vec![a, b]);
    assert!(stats.comparison_errors >= 1);
}

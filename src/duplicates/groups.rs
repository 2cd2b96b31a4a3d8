//! Fingerprint grouping and duplicate group types.
//!
//! # Overview
//!
//! Grouping is the first content-aware phase of duplicate detection. Every
//! comparable [`FileRecord`] is streamed through BLAKE3 and records sharing a
//! digest land in the same [`FingerprintBucket`]. Buckets are a superset of
//! true duplicates: the verifier still byte-compares their members before a
//! [`DuplicateGroup`] is produced.
//!
//! Bucket order follows the first occurrence of each fingerprint in scan
//! order, and paths inside a bucket keep scan order too. Hashing may run on
//! a bounded thread pool, but results are collected in input order before
//! the buckets are built, so the output does not depend on thread timing.
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::{group_by_fingerprint, GroupConfig};
//! use ccdupe::scanner::{FileRecord, Hasher};
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/a.txt"), 5),
//!     FileRecord::new(PathBuf::from("/b.txt"), 5),
//!     FileRecord::new(PathBuf::from("/c.txt"), 7),
//! ];
//!
//! let (buckets, stats) = group_by_fingerprint(records, &Hasher::new(), &GroupConfig::default());
//! println!("{} buckets from {} hashed files", buckets.len(), stats.hashed_files);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;

use crate::progress::{ProgressCallback, PHASE_FINGERPRINT};
use crate::scanner::{hash_to_hex, FileRecord, Hash, HashError, Hasher, DEFAULT_IO_THREADS};

/// Files sharing one fingerprint, in scan order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintBucket {
    /// BLAKE3 digest shared by every path in the bucket
    pub fingerprint: Hash,
    /// Size of the first file that produced this fingerprint
    pub size: u64,
    /// Paths in scan order
    pub paths: Vec<PathBuf>,
    /// Resolved targets of members that are followed links
    pub link_targets: BTreeMap<PathBuf, PathBuf>,
}

impl FingerprintBucket {
    /// Create a bucket with explicit members.
    #[must_use]
    pub fn new(fingerprint: Hash, size: u64, paths: Vec<PathBuf>) -> Self {
        Self {
            fingerprint,
            size,
            paths,
            link_targets: BTreeMap::new(),
        }
    }

    fn push(&mut self, record: FileRecord) {
        if record.followed {
            self.link_targets
                .insert(record.path.clone(), record.content_path().to_path_buf());
        }
        self.paths.push(record.path);
    }

    /// Number of paths in the bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if the bucket has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Confirmed duplicate group of files.
///
/// Every path is byte-identical to every other path in the group, and a
/// path never appears in two groups from the same scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// BLAKE3 hash of the file content (32 bytes)
    pub fingerprint: Hash,
    /// File size in bytes (shared by all files in the group)
    pub size: u64,
    /// Member paths, at least two, in scan order
    pub paths: Vec<PathBuf>,
    /// Resolved targets of members that are followed links
    pub link_targets: BTreeMap<PathBuf, PathBuf>,
}

impl DuplicateGroup {
    /// Create a new duplicate group.
    #[must_use]
    pub fn new(fingerprint: Hash, size: u64, paths: Vec<PathBuf>) -> Self {
        Self {
            fingerprint,
            size,
            paths,
            link_targets: BTreeMap::new(),
        }
    }

    /// Record that member `path` is a link resolving to `target`.
    #[must_use]
    pub fn with_link_target(mut self, path: PathBuf, target: PathBuf) -> Self {
        self.link_targets.insert(path, target);
        self
    }

    /// Where member `path` points, if it is a followed link.
    #[must_use]
    pub fn link_target(&self, path: &Path) -> Option<&Path> {
        self.link_targets.get(path).map(PathBuf::as_path)
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Total wasted space (all copies minus one).
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }

    /// Number of duplicate copies (total - 1 original).
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// Hash as hexadecimal string.
    #[must_use]
    pub fn hash_hex(&self) -> String {
        hash_to_hex(&self.fingerprint)
    }
}

/// Configuration for the grouping and verification phases.
#[derive(Clone)]
pub struct GroupConfig {
    /// Number of I/O threads. 1 means everything runs on the calling thread.
    pub io_threads: usize,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for GroupConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupConfig")
            .field("io_threads", &self.io_threads)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            io_threads: DEFAULT_IO_THREADS,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl GroupConfig {
    /// Set the number of I/O threads (clamped to at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the shutdown flag.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Statistics from the fingerprint grouping phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Records handed to the grouper
    pub input_records: usize,
    /// Unfollowed links left out of comparison
    pub links_excluded: usize,
    /// Records that were fingerprinted successfully
    pub hashed_files: usize,
    /// Records dropped because hashing failed
    pub failed_files: usize,
    /// Fingerprints seen exactly once (dropped)
    pub unique_fingerprints: usize,
    /// Buckets with 2+ members
    pub buckets: usize,
    /// Files across all returned buckets
    pub bucketed_files: usize,
    /// Whether hashing stopped early on shutdown
    pub interrupted: bool,
}

/// Group records by the BLAKE3 digest of their full content.
///
/// Unfollowed links are counted in [`GroupingStats::links_excluded`] and never
/// hashed. A record whose hash fails is logged and dropped. Buckets with a
/// single member are dropped before returning.
///
/// # Arguments
///
/// * `records` - Records from the scanner, in scan order
/// * `hasher` - Hasher used for every record
/// * `config` - Thread count, shutdown flag and progress callback
///
/// # Returns
///
/// A tuple of:
/// - `Vec<FingerprintBucket>` - Buckets with 2+ paths, ordered by first occurrence
/// - `GroupingStats` - Statistics about the grouping operation
#[must_use]
pub fn group_by_fingerprint(
    records: impl IntoIterator<Item = FileRecord>,
    hasher: &Hasher,
    config: &GroupConfig,
) -> (Vec<FingerprintBucket>, GroupingStats) {
    let mut stats = GroupingStats::default();

    let mut candidates: Vec<FileRecord> = Vec::new();
    for record in records {
        stats.input_records += 1;
        if record.is_comparable() {
            candidates.push(record);
        } else {
            log::trace!("Excluding unfollowed link: {}", record.path.display());
            stats.links_excluded += 1;
        }
    }

    if candidates.is_empty() {
        log::debug!("Grouping: No files to fingerprint");
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_FINGERPRINT, candidates.len());
    }

    log::info!("Fingerprinting {} files", candidates.len());

    let counter = AtomicUsize::new(0);
    let hash_one = |record: FileRecord| -> Option<(FileRecord, Result<Hash, HashError>)> {
        if config.is_shutdown_requested() {
            return None;
        }
        let result = hasher.full_hash(&record.path);
        if let Some(ref callback) = config.progress_callback {
            let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
            callback.on_progress(current, &record.path.to_string_lossy());
        }
        Some((record, result))
    };

    let results: Vec<Option<(FileRecord, Result<Hash, HashError>)>> =
        match super::io_pool(config.io_threads) {
            Some(pool) => pool.install(|| candidates.into_par_iter().map(hash_one).collect()),
            None => candidates.into_iter().map(hash_one).collect(),
        };

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Grouping: Interrupted by shutdown signal");
    }

    let mut index: HashMap<Hash, usize> = HashMap::new();
    let mut buckets: Vec<FingerprintBucket> = Vec::new();

    for (record, result) in results.into_iter().flatten() {
        match result {
            Ok(hash) => {
                stats.hashed_files += 1;
                let i = *index.entry(hash).or_insert_with(|| {
                    buckets.push(FingerprintBucket::new(hash, record.size, Vec::new()));
                    buckets.len() - 1
                });
                buckets[i].push(record);
            }
            Err(HashError::Interrupted(_)) => {}
            Err(e) => {
                log::error!("Failed to fingerprint {}: {} ({})", record.path.display(), e, e.kind());
                stats.failed_files += 1;
            }
        }
    }

    buckets.retain(|bucket| {
        if bucket.len() < 2 {
            stats.unique_fingerprints += 1;
            false
        } else {
            stats.buckets += 1;
            stats.bucketed_files += bucket.len();
            log::debug!(
                "Fingerprint {}: {} candidates",
                hash_to_hex(&bucket.fingerprint),
                bucket.len()
            );
            true
        }
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_FINGERPRINT);
    }

    log::info!(
        "Fingerprinting complete: {} files hashed, {} buckets, {} failures",
        stats.hashed_files,
        stats.buckets,
        stats.failed_files
    );

    (buckets, stats)
}

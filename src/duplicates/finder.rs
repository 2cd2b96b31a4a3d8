//! Duplicate finder implementation.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Scan**: walk the tree and collect [`FileRecord`]s (see [`crate::scanner::walker`])
//! 2. **Fingerprint**: bucket records by BLAKE3 digest (see [`crate::duplicates::groups`])
//! 3. **Verify**: byte-compare bucket members (see [`crate::duplicates::verifier`])
//!
//! Per-file failures in any phase are logged and the file is left out.
//! Only an unreadable scan root makes the whole scan fail.
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::{DuplicateFinder, FinderConfig};
//! use ccdupe::scanner::ScanConfig;
//! use std::path::Path;
//!
//! let config = FinderConfig::default().with_scan_config(ScanConfig::default().with_min_size(1));
//! let result = DuplicateFinder::new(config).find_duplicates(Path::new(".")).unwrap();
//!
//! for group in &result.groups {
//!     println!("{} copies of {}", group.len(), group.hash_hex());
//! }
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;

use super::comparator::Comparator;
use super::groups::{group_by_fingerprint, DuplicateGroup, GroupConfig};
use super::verifier::verify_all;
use crate::error::ErrorKind;
use crate::progress::{ProgressCallback, PHASE_SCAN};
use crate::scanner::{Hasher, ScanConfig, ScanError, Walker};

/// Configuration for the duplicate finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Scan parameters (minimum size, symlink policy, thread count).
    pub scan: ScanConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("scan", &self.scan)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the scan configuration.
    #[must_use]
    pub fn with_scan_config(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    fn group_config(&self) -> GroupConfig {
        GroupConfig {
            io_threads: self.scan.io_threads.max(1),
            shutdown_flag: self.shutdown_flag.clone(),
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Summary statistics for a completed scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Records produced by the walker
    pub files_found: usize,
    /// Entries below the root that could not be read
    pub skipped_entries: usize,
    /// Unfollowed links left out of comparison
    pub links_excluded: usize,
    /// Files whose fingerprint could not be computed
    pub hash_failures: usize,
    /// Byte comparisons performed
    pub comparisons: usize,
    /// Comparisons that failed with an I/O error
    pub comparison_errors: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding originals)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
}

impl ScanSummary {
    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_space).to_string()
    }
}

/// The outcome of one scan, consumed by a resolution driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Confirmed duplicate groups, sorted by first path
    pub groups: Vec<DuplicateGroup>,
    /// Files that were successfully fingerprinted. Unfollowed links are
    /// excluded; see `links_excluded`.
    pub total_files: usize,
    /// Statistics about the scan
    pub stats: ScanSummary,
}

impl ScanResult {
    /// Sum of group sizes.
    #[must_use]
    pub fn total_duplicates(&self) -> usize {
        self.groups.iter().map(DuplicateGroup::len).sum()
    }

    /// Group paths as plain lists, the shape the web API returns.
    #[must_use]
    pub fn path_lists(&self) -> Vec<Vec<String>> {
        self.groups
            .iter()
            .map(|g| g.paths.iter().map(|p| p.display().to_string()).collect())
            .collect()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The scan root could not be read.
    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl FinderError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Interrupted => ErrorKind::IoFailure,
            Self::Scan(e) => e.kind(),
        }
    }
}

/// Duplicate finder that runs the scan, fingerprint and verify phases.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
    comparator: Comparator,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self {
            config,
            hasher,
            comparator: Comparator::new(),
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// Use a specific comparator (e.g. a different chunk size).
    #[must_use]
    pub fn with_comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    /// Find all duplicate files under `path`.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The root does not exist, is not a directory or cannot be listed
    /// - The scan is interrupted by shutdown signal
    pub fn find_duplicates(&self, path: &Path) -> Result<ScanResult, FinderError> {
        let start_time = Instant::now();
        let mut summary = ScanSummary::default();

        log::info!(
            "Starting duplicate scan of {} (min size {}, follow symlinks: {})",
            path.display(),
            self.config.scan.min_size,
            self.config.scan.follow_symlinks
        );

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start(PHASE_SCAN, 0);
            callback.on_message(&format!("Scanning {}", path.display()));
        }

        let mut walker = Walker::new(path, self.config.scan.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let scanned = walker.scan();

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end(PHASE_SCAN);
        }

        let (records, scan_stats) = scanned.map_err(|e| {
            log::error!("Cannot scan {}: {}", path.display(), e);
            e
        })?;

        summary.files_found = scan_stats.files_found;
        summary.skipped_entries = scan_stats.skipped_entries;

        if scan_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let group_config = self.config.group_config();
        let (buckets, grouping_stats) =
            group_by_fingerprint(records, &self.hasher, &group_config);

        summary.links_excluded = grouping_stats.links_excluded;
        summary.hash_failures = grouping_stats.failed_files;

        if grouping_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (groups, verify_stats) = verify_all(&buckets, &self.comparator, &group_config);

        if verify_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        summary.comparisons = verify_stats.comparisons;
        summary.comparison_errors = verify_stats.comparison_errors;
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
        summary.scan_duration = start_time.elapsed();

        let result = ScanResult {
            groups,
            total_files: grouping_stats.hashed_files,
            stats: summary,
        };

        log::info!(
            "Scan complete: {} files, {} duplicate groups, {} reclaimable in {:.2?}",
            result.total_files,
            result.stats.duplicate_groups,
            result.stats.reclaimable_display(),
            result.stats.scan_duration
        );

        Ok(result)
    }
}

//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Fingerprint grouping (BLAKE3 buckets)
//! - Byte-exact file comparison
//! - Bucket verification into confirmed duplicate groups
//! - The end-to-end finder pipeline

pub mod comparator;
pub mod finder;
pub mod groups;
pub mod verifier;

pub use comparator::{identical, CompareError, Comparator, COMPARE_CHUNK_SIZE};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanResult, ScanSummary};
pub use groups::{
    group_by_fingerprint, DuplicateGroup, FingerprintBucket, GroupConfig, GroupingStats,
};
pub use verifier::{verify_all, verify_bucket, VerifyStats};

/// Build the bounded I/O pool, or `None` when work should stay on the
/// calling thread.
pub(crate) fn io_pool(threads: usize) -> Option<rayon::ThreadPool> {
    if threads <= 1 {
        return None;
    }
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => Some(pool),
        Err(e) => {
            log::warn!("Failed to create I/O thread pool, running sequentially: {}", e);
            None
        }
    }
}

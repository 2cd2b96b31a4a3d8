//! Bucket verification.
//!
//! A fingerprint bucket only says that files probably match. The verifier
//! byte-compares bucket members with the [`Comparator`] and splits the
//! bucket into [`DuplicateGroup`]s of files that really are identical.
//!
//! Each path, in bucket order, is tried against the groups created so far,
//! oldest first. Within a group the path is compared with members in order
//! until one comparison completes: a match joins the group, a mismatch moves
//! on to the next group. A comparison error is logged and the next member of
//! the same group is tried. A path that matches nothing starts a new group.
//! Groups left with a single member are discarded.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::comparator::Comparator;
use super::groups::{DuplicateGroup, FingerprintBucket, GroupConfig};
use crate::progress::PHASE_VERIFY;
use crate::scanner::hash_to_hex;

/// Statistics from the verification phase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyStats {
    /// Buckets verified
    pub buckets: usize,
    /// Comparisons attempted
    pub comparisons: usize,
    /// Comparisons that failed with an I/O error
    pub comparison_errors: usize,
    /// Buckets that split into more than one group (fingerprint collisions)
    pub split_buckets: usize,
    /// Confirmed groups
    pub groups: usize,
    /// Files across all confirmed groups
    pub duplicate_files: usize,
    /// Whether verification stopped early on shutdown
    pub interrupted: bool,
}

impl VerifyStats {
    fn merge(&mut self, other: &Self) {
        self.buckets += other.buckets;
        self.comparisons += other.comparisons;
        self.comparison_errors += other.comparison_errors;
        self.split_buckets += other.split_buckets;
        self.groups += other.groups;
        self.duplicate_files += other.duplicate_files;
        self.interrupted |= other.interrupted;
    }
}

/// Split one bucket into groups of byte-identical files.
///
/// Comparison errors never abort the bucket; the affected pair is skipped.
#[must_use]
pub fn verify_bucket(
    bucket: &FingerprintBucket,
    comparator: &Comparator,
) -> (Vec<DuplicateGroup>, VerifyStats) {
    let mut stats = VerifyStats {
        buckets: 1,
        ..Default::default()
    };
    let mut groups: Vec<Vec<PathBuf>> = Vec::new();

    for path in &bucket.paths {
        if groups.iter().any(|group| group.contains(path)) {
            log::debug!("Ignoring repeated path in bucket: {}", path.display());
            continue;
        }

        let joined = groups.iter().position(|group| {
            for member in group {
                stats.comparisons += 1;
                match comparator.identical(member, path) {
                    Ok(same) => return same,
                    Err(e) => {
                        stats.comparison_errors += 1;
                        log::warn!(
                            "Cannot compare {} with {}: {} ({})",
                            member.display(),
                            path.display(),
                            e,
                            e.kind()
                        );
                    }
                }
            }
            false
        });

        match joined {
            Some(i) => groups[i].push(path.clone()),
            None => groups.push(vec![path.clone()]),
        }
    }

    let confirmed: Vec<DuplicateGroup> = groups
        .into_iter()
        .filter(|paths| paths.len() >= 2)
        .map(|paths| {
            let mut group = DuplicateGroup::new(bucket.fingerprint, bucket.size, paths);
            group.link_targets = bucket
                .link_targets
                .iter()
                .filter(|(path, _)| group.paths.contains(path))
                .map(|(path, target)| (path.clone(), target.clone()))
                .collect();
            group
        })
        .collect();

    if confirmed.len() > 1 {
        stats.split_buckets = 1;
        log::info!(
            "Fingerprint {} split into {} groups",
            hash_to_hex(&bucket.fingerprint),
            confirmed.len()
        );
    }
    stats.groups = confirmed.len();
    stats.duplicate_files = confirmed.iter().map(DuplicateGroup::len).sum();

    (confirmed, stats)
}

/// Verify every bucket and return groups sorted by their first path.
///
/// Buckets are verified in parallel on the bounded I/O pool when
/// `config.io_threads > 1`.
#[must_use]
pub fn verify_all(
    buckets: &[FingerprintBucket],
    comparator: &Comparator,
    config: &GroupConfig,
) -> (Vec<DuplicateGroup>, VerifyStats) {
    let mut stats = VerifyStats::default();

    if buckets.is_empty() {
        return (Vec::new(), stats);
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start(PHASE_VERIFY, buckets.len());
    }

    log::info!("Verifying {} fingerprint buckets", buckets.len());

    let counter = AtomicUsize::new(0);
    let verify_one = |bucket: &FingerprintBucket| {
        if config.is_shutdown_requested() {
            return None;
        }
        let result = verify_bucket(bucket, comparator);
        if let Some(ref callback) = config.progress_callback {
            let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
            let first = bucket
                .paths
                .first()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            callback.on_progress(current, &first);
        }
        Some(result)
    };

    let results: Vec<Option<(Vec<DuplicateGroup>, VerifyStats)>> =
        match super::io_pool(config.io_threads) {
            Some(pool) => pool.install(|| buckets.par_iter().map(verify_one).collect()),
            None => buckets.iter().map(verify_one).collect(),
        };

    let mut groups = Vec::new();
    for (bucket_groups, bucket_stats) in results.into_iter().flatten() {
        stats.merge(&bucket_stats);
        groups.extend(bucket_groups);
    }

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Verification: Interrupted by shutdown signal");
    }

    groups.sort_by(|a, b| a.paths.first().cmp(&b.paths.first()));

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end(PHASE_VERIFY);
    }

    log::info!(
        "Verification complete: {} groups, {} comparisons, {} comparison errors",
        stats.groups,
        stats.comparisons,
        stats.comparison_errors
    );

    (groups, stats)
}

//! Scanner module for directory traversal and file hashing.
//!
//! This module provides functionality for:
//! - Sequential, sorted directory walking using walkdir
//! - Symlink chain resolution with cycle detection
//! - Content fingerprinting with BLAKE3
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and file discovery
//! - [`resolver`]: Following symlinks to their terminal target
//! - [`hasher`]: BLAKE3 file hashing (streaming)
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::scanner::{ScanConfig, Walker};
//! use std::path::Path;
//!
//! let config = ScanConfig::default()
//!     .with_min_size(1024)
//!     .with_follow_symlinks(true);
//!
//! let walker = Walker::new(Path::new("."), config);
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(file) => println!("{}: {} bytes", file.path.display(), file.size),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod hasher;
pub mod resolver;
pub mod walker;

use std::path::{Path, PathBuf};

use crate::error::ErrorKind;

pub use hasher::{hash_to_hex, Hash, Hasher};
pub use resolver::{resolve, ResolveError, MAX_LINK_HOPS};
pub use walker::{ScanStats, Walker};

/// Default number of threads used for hashing and verification.
pub const DEFAULT_IO_THREADS: usize = 4;

/// A file discovered by the scanner.
///
/// For a followed symlink, `path` is the link's own path, `size` is the
/// size of the resolved target and `link_target` is that target. For an
/// unfollowed link, `size` is the link's own size and `link_target` is the
/// raw link text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path to the file as discovered under the scan root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Whether this entry is a symbolic link
    pub is_link: bool,
    /// Where the link points, if this entry is a link
    pub link_target: Option<PathBuf>,
    /// Whether the link was resolved to a regular file
    pub followed: bool,
}

impl FileRecord {
    /// Create a record for a regular file.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            is_link: false,
            link_target: None,
            followed: false,
        }
    }

    /// Create a record for a link that was resolved to `target`.
    ///
    /// # Arguments
    ///
    /// * `path` - The link's own path
    /// * `size` - Size of the resolved target
    /// * `target` - The terminal, non-link target
    #[must_use]
    pub fn followed_link(path: PathBuf, size: u64, target: PathBuf) -> Self {
        Self {
            path,
            size,
            is_link: true,
            link_target: Some(target),
            followed: true,
        }
    }

    /// Create a record for a link that was not followed.
    #[must_use]
    pub fn unfollowed_link(path: PathBuf, size: u64, raw_target: Option<PathBuf>) -> Self {
        Self {
            path,
            size,
            is_link: true,
            link_target: raw_target,
            followed: false,
        }
    }

    /// Whether this record takes part in duplicate comparison.
    ///
    /// Unfollowed links are recorded but never compared.
    #[must_use]
    pub fn is_comparable(&self) -> bool {
        !self.is_link || self.followed
    }

    /// The path whose bytes represent this record.
    ///
    /// This is the resolved target for followed links and the record's own
    /// path otherwise.
    #[must_use]
    pub fn content_path(&self) -> &Path {
        match (&self.link_target, self.followed) {
            (Some(target), true) => target,
            _ => &self.path,
        }
    }
}

/// Configuration for a single scan.
///
/// Passed by value to the walker, grouper and verifier; nothing reads
/// configuration from global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Minimum file size to include (in bytes, inclusive).
    pub min_size: u64,

    /// Resolve symlinks to their targets and compare the target content.
    /// Symlinked directories are never descended into.
    pub follow_symlinks: bool,

    /// Threads used for hashing and verification. 1 means sequential.
    pub io_threads: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_size: 0,
            follow_symlinks: false,
            io_threads: DEFAULT_IO_THREADS,
        }
    }
}

impl ScanConfig {
    /// Set the minimum file size.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Enable or disable symlink following.
    #[must_use]
    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Set the number of I/O threads (clamped to at least 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A symlink could not be resolved.
    #[error("Cannot follow {path}: {source}")]
    Link {
        /// The link that was being followed
        path: PathBuf,
        /// Why resolution failed
        #[source]
        source: ResolveError,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) => ErrorKind::AccessDenied,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotADirectory(_) => ErrorKind::IoFailure,
            Self::Link { source, .. } => source.kind(),
            Self::Io { source, .. } => ErrorKind::from_io(source),
        }
    }
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Hashing stopped because shutdown was requested.
    #[error("Hashing interrupted: {0}")]
    Interrupted(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::AccessDenied,
            Self::Interrupted(_) => ErrorKind::IoFailure,
            Self::Io { source, .. } => ErrorKind::from_io(source),
        }
    }
}

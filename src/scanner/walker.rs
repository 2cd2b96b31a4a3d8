//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting [`FileRecord`]s for duplicate detection.
//!
//! # Features
//!
//! - Sequential traversal in lexical order per directory
//! - Symlinked directories are never descended into
//! - Optional symlink following for file entries via [`resolve`]
//! - Inclusive minimum size filter
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::scanner::{ScanConfig, Walker};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), ScanConfig::default());
//! let (records, stats) = walker.scan().unwrap();
//! println!("{} files, {} skipped", records.len(), stats.skipped_entries);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::resolver::resolve;
use super::{FileRecord, ScanConfig, ScanError};
use crate::progress::ProgressCallback;

/// Counters collected during a walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Records emitted (regular files and links)
    pub files_found: usize,
    /// Links resolved to a regular file
    pub links_followed: usize,
    /// Links recorded without following
    pub links_recorded: usize,
    /// Entries below the size threshold
    pub too_small: usize,
    /// Sockets, fifos, devices and links to non-files
    pub not_regular: usize,
    /// Entries that could not be read
    pub skipped_entries: usize,
    /// Whether the walk stopped early on shutdown
    pub interrupted: bool,
}

/// What the walker decided about a single directory entry.
enum Visit {
    Record(FileRecord),
    Directory,
    NotRegular,
    TooSmall,
    Skipped(ScanError),
}

/// Directory walker for file discovery.
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Scan configuration
    config: ScanConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Walker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Walker")
            .field("root", &self.root)
            .field("config", &self.config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Scan configuration
    #[must_use]
    pub fn new(path: &Path, config: ScanConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops before the next
    /// directory entry.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Report each emitted record to a progress callback.
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

    /// Walk the tree, validating the root first and collecting every record.
    ///
    /// Per-entry failures below the root are logged and counted in
    /// [`ScanStats::skipped_entries`]; they never abort the scan.
    ///
    /// # Errors
    ///
    /// - [`ScanError::NotFound`] if the root does not exist
    /// - [`ScanError::NotADirectory`] if the root is not a directory
    /// - [`ScanError::PermissionDenied`] if the root cannot be listed
    pub fn scan(&self) -> Result<(Vec<FileRecord>, ScanStats), ScanError> {
        self.validate_root()?;

        log::debug!("Walking {}", self.root.display());

        let mut records = Vec::new();
        let mut stats = ScanStats::default();

        for visit in self.entries() {
            match visit {
                Visit::Record(record) => {
                    stats.files_found += 1;
                    if record.is_link {
                        if record.followed {
                            stats.links_followed += 1;
                        } else {
                            stats.links_recorded += 1;
                        }
                    }
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(stats.files_found, &record.path.to_string_lossy());
                    }
                    records.push(record);
                }
                Visit::Directory => {}
                Visit::NotRegular => stats.not_regular += 1,
                Visit::TooSmall => stats.too_small += 1,
                Visit::Skipped(_) => stats.skipped_entries += 1,
            }
        }

        if self.is_shutdown_requested() {
            log::debug!("Walker: Shutdown requested, stopped early");
            stats.interrupted = true;
        }

        log::debug!(
            "Walk of {} done: {} records, {} skipped, {} below minimum size",
            self.root.display(),
            stats.files_found,
            stats.skipped_entries,
            stats.too_small
        );

        Ok((records, stats))
    }

    /// Iterate over discovered records without collecting them.
    ///
    /// Filtered entries are omitted; entries that could not be read are
    /// yielded as errors. The root is not validated up front, so an
    /// unreadable root shows up as a single error item.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ccdupe::scanner::{ScanConfig, Walker};
    /// use std::path::Path;
    ///
    /// let walker = Walker::new(Path::new("."), ScanConfig::default());
    /// let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
    /// println!("Found {} files", files.len());
    /// ```
    pub fn walk(&self) -> impl Iterator<Item = Result<FileRecord, ScanError>> + '_ {
        self.entries().filter_map(|visit| match visit {
            Visit::Record(record) => Some(Ok(record)),
            Visit::Skipped(err) => Some(Err(err)),
            Visit::Directory | Visit::NotRegular | Visit::TooSmall => None,
        })
    }

    fn entries(&self) -> impl Iterator<Item = Visit> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .take_while(move |_| !self.is_shutdown_requested())
            .map(move |entry| match entry {
                Ok(entry) => self.visit(&entry),
                Err(e) => Visit::Skipped(self.handle_walk_error(e)),
            })
    }

    fn validate_root(&self) -> Result<(), ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| self.root_error(e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        fs::read_dir(&self.root).map_err(|e| self.root_error(e))?;
        Ok(())
    }

    fn root_error(&self, error: std::io::Error) -> ScanError {
        match error.kind() {
            std::io::ErrorKind::NotFound => ScanError::NotFound(self.root.clone()),
            std::io::ErrorKind::PermissionDenied => ScanError::PermissionDenied(self.root.clone()),
            _ => ScanError::Io {
                path: self.root.clone(),
                source: error,
            },
        }
    }

    fn visit(&self, entry: &DirEntry) -> Visit {
        let file_type = entry.file_type();
        let path = entry.path().to_path_buf();

        if file_type.is_dir() {
            return Visit::Directory;
        }

        if file_type.is_symlink() {
            return if self.config.follow_symlinks {
                self.visit_followed_link(path)
            } else {
                self.visit_unfollowed_link(entry, path)
            };
        }

        if !file_type.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return Visit::NotRegular;
        }

        match entry.metadata() {
            Ok(metadata) => self.apply_size_filter(FileRecord::new(path, metadata.len())),
            Err(e) => Visit::Skipped(self.handle_walk_error(e)),
        }
    }

    fn visit_followed_link(&self, path: PathBuf) -> Visit {
        let target = match resolve(&path) {
            Ok(target) => target,
            Err(source) => {
                log::warn!("Skipping link {}: {}", path.display(), source);
                return Visit::Skipped(ScanError::Link { path, source });
            }
        };

        let metadata = match fs::metadata(&target) {
            Ok(m) => m,
            Err(e) => return Visit::Skipped(self.handle_io_error(&path, e)),
        };

        if !metadata.is_file() {
            log::debug!(
                "Skipping link to non-regular file: {} -> {}",
                path.display(),
                target.display()
            );
            return Visit::NotRegular;
        }

        log::trace!("Following {} -> {}", path.display(), target.display());
        self.apply_size_filter(FileRecord::followed_link(path, metadata.len(), target))
    }

    fn visit_unfollowed_link(&self, entry: &DirEntry, path: PathBuf) -> Visit {
        // walkdir does not follow links here, so this is lstat metadata
        let size = match entry.metadata() {
            Ok(m) => m.len(),
            Err(e) => return Visit::Skipped(self.handle_walk_error(e)),
        };
        let raw_target = fs::read_link(&path).ok();
        self.apply_size_filter(FileRecord::unfollowed_link(path, size, raw_target))
    }

    fn apply_size_filter(&self, record: FileRecord) -> Visit {
        if record.size < self.config.min_size {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                record.size,
                record.path.display()
            );
            return Visit::TooSmall;
        }
        Visit::Record(record)
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: std::io::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            ErrorKind::NotFound => {
                log::debug!("File not found (may have been deleted): {}", path.display());
                ScanError::NotFound(path.to_path_buf())
            }
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle walkdir errors.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        let description = error.to_string();

        match error.into_io_error() {
            Some(io_error) => self.handle_io_error(&path, io_error),
            None => {
                log::warn!("Walker error for {}: {}", path.display(), description);
                ScanError::Io {
                    path,
                    source: std::io::Error::other(description),
                }
            }
        }
    }
}

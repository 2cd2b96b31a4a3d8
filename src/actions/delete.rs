//! File deletion, permanent or via the trash crate.
//!
//! # Overview
//!
//! [`delete_file`] removes one path, chosen by the caller. By default the
//! file is removed permanently; [`DeleteConfig::trash`] moves it to the
//! system trash instead so it can be recovered.
//!
//! Symlinks are removed as links. Their targets are never touched.
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::actions::delete::{delete_file, DeleteConfig};
//! use std::path::Path;
//!
//! match delete_file(Path::new("/path/to/duplicate.txt"), &DeleteConfig::trash()) {
//!     Ok(result) => println!("Deleted: {}", result.path.display()),
//!     Err(e) => eprintln!("Failed: {}", e),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::error::ErrorKind;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The path is a directory; only files and links are deleted.
    #[error("not a file: {0}")]
    NotAFile(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// File that could not be trashed
        path: PathBuf,
        /// Message reported by the trash backend
        message: String,
    },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// File that could not be removed
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }

    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::AccessDenied,
            Self::NotAFile(_) | Self::TrashFailed { .. } => ErrorKind::IoFailure,
            Self::Io { source, .. } => ErrorKind::from_io(source),
        }
    }

    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Result of a successful deletion operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted entry in bytes (the link itself for symlinks).
    pub size: u64,
    /// Whether deletion was permanent (true) or to trash (false).
    pub permanent: bool,
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Remove permanently instead of moving to the trash.
    pub permanent: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self::permanent()
    }
}

impl DeleteConfig {
    /// Create config for trash deletion.
    #[must_use]
    pub fn trash() -> Self {
        Self { permanent: false }
    }

    /// Create config for permanent deletion.
    #[must_use]
    pub fn permanent() -> Self {
        Self { permanent: true }
    }
}

/// Delete a single file or symlink.
///
/// # Errors
///
/// - `NotFound` if the path no longer exists
/// - `PermissionDenied` if deletion is not allowed
/// - `NotAFile` if the path is a directory
/// - `TrashFailed` if the trash backend refuses the file
pub fn delete_file(path: &Path, config: &DeleteConfig) -> Result<DeleteResult, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;

    if metadata.is_dir() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }

    let size = metadata.len();

    if config.permanent {
        fs::remove_file(path).map_err(|e| {
            log::error!("Permanent delete failed for {}: {}", path.display(), e);
            DeleteError::from_io(path, e)
        })?;
        log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    } else {
        trash::delete(path).map_err(|e| {
            log::error!("Trash operation failed for {}: {}", path.display(), e);
            DeleteError::TrashFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        })?;
        log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    }

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: config.permanent,
    })
}

//! Symlink chain resolution.
//!
//! [`resolve`] follows a chain of symbolic links one hop at a time until it
//! reaches an entry that is not a link. Relative link targets are joined to
//! the directory containing the link, the same way the OS interprets them.
//!
//! The walk is capped at [`MAX_LINK_HOPS`] so that `a -> b -> a` style cycles
//! terminate with [`ResolveError::LinkCycle`] instead of looping forever.
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::scanner::resolver::resolve;
//! use std::path::Path;
//!
//! match resolve(Path::new("/home/user/latest.log")) {
//!     Ok(target) => println!("points at {}", target.display()),
//!     Err(e) => eprintln!("skipping: {e}"),
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::ErrorKind;

/// Maximum number of links followed before giving up.
pub const MAX_LINK_HOPS: usize = 40;

/// Errors that can occur while resolving a symlink chain.
#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    /// A link in the chain is missing, dangling or unreadable.
    #[error("broken link {path}: {source}")]
    BrokenLink {
        /// The chain element that could not be read
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The chain is longer than [`MAX_LINK_HOPS`].
    #[error("link cycle detected at {0} (more than {MAX_LINK_HOPS} hops)")]
    LinkCycle(PathBuf),
}

impl ResolveError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BrokenLink { .. } => ErrorKind::BrokenLink,
            Self::LinkCycle(_) => ErrorKind::LinkCycle,
        }
    }
}

/// Resolve `path` to the first entry in its link chain that is not a symlink.
///
/// A path that is not a link resolves to itself.
///
/// # Errors
///
/// - [`ResolveError::BrokenLink`] if any element of the chain cannot be
///   `lstat`ed or its target cannot be read
/// - [`ResolveError::LinkCycle`] after [`MAX_LINK_HOPS`] hops
pub fn resolve(path: &Path) -> Result<PathBuf, ResolveError> {
    let mut current = path.to_path_buf();

    for hop in 0..=MAX_LINK_HOPS {
        let metadata = fs::symlink_metadata(&current).map_err(|source| ResolveError::BrokenLink {
            path: current.clone(),
            source,
        })?;

        if !metadata.file_type().is_symlink() {
            if hop > 0 {
                log::trace!(
                    "Resolved {} -> {} in {} hop(s)",
                    path.display(),
                    current.display(),
                    hop
                );
            }
            return Ok(current);
        }

        let target = fs::read_link(&current).map_err(|source| ResolveError::BrokenLink {
            path: current.clone(),
            source,
        })?;

        current = if target.is_absolute() {
            target
        } else {
            current
                .parent()
                .map_or_else(|| target.clone(), |parent| parent.join(&target))
        };
    }

    log::warn!("Giving up on symlink chain starting at {}", path.display());
    Err(ResolveError::LinkCycle(path.to_path_buf()))
}

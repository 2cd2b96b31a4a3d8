//! Byte-exact file comparison.
//!
//! [`Comparator::identical`] reads two files side by side in fixed-size
//! chunks. Each chunk is filled completely before comparing (short reads are
//! retried), so the result never depends on how the OS splits reads.
//!
//! Two files are identical iff every chunk matches and both streams end at
//! the same offset. One file ending first is a plain `false`. Any other read
//! failure is reported as a [`CompareError`] rather than folded into `false`.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::ErrorKind;

/// Default comparison chunk size (64 KiB).
pub const COMPARE_CHUNK_SIZE: usize = 64 * 1024;

/// Errors that can occur while comparing two files.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// One of the files was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when opening or reading a file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl CompareError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::AccessDenied,
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

/// Chunked streaming file comparator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Comparator {
    chunk_size: usize,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new()
    }
}

impl Comparator {
    /// Create a comparator using [`COMPARE_CHUNK_SIZE`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk_size: COMPARE_CHUNK_SIZE,
        }
    }

    /// Use a different chunk size (clamped to at least 1 byte).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The chunk size in bytes.
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Determine whether two files have exactly the same bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] if either file cannot be opened or read.
    /// Reaching the end of one file before the other is not an error.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use ccdupe::duplicates::Comparator;
    /// use std::path::Path;
    ///
    /// let same = Comparator::new()
    ///     .identical(Path::new("a.txt"), Path::new("b.txt"))
    ///     .unwrap();
    /// ```
    pub fn identical(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        let mut file_a = File::open(a).map_err(|e| CompareError::from_io(a, e))?;
        let mut file_b = File::open(b).map_err(|e| CompareError::from_io(b, e))?;

        let mut buf_a = vec![0u8; self.chunk_size];
        let mut buf_b = vec![0u8; self.chunk_size];

        loop {
            let n_a = fill_chunk(&mut file_a, &mut buf_a).map_err(|e| CompareError::from_io(a, e))?;
            let n_b = fill_chunk(&mut file_b, &mut buf_b).map_err(|e| CompareError::from_io(b, e))?;

            if n_a != n_b || buf_a[..n_a] != buf_b[..n_b] {
                log::trace!("Files differ: {} vs {}", a.display(), b.display());
                return Ok(false);
            }
            if n_a < self.chunk_size {
                return Ok(true);
            }
        }
    }
}

/// Compare two files with the default chunk size.
///
/// # Errors
///
/// See [`Comparator::identical`].
pub fn identical(a: &Path, b: &Path) -> Result<bool, CompareError> {
    Comparator::new().identical(a, b)
}

/// Read until `buf` is full or the stream ends, returning the bytes read.
fn fill_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

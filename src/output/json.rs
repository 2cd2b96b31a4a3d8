//! JSON output formatter for duplicate scan results.
//!
//! Provides machine-readable JSON output for scripting and automation.
//! JSON mode never deletes anything.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicate_groups": [
//!     {
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"],
//!       "hash": "abc123..."
//!     }
//!   ],
//!   "total_files": 3,
//!   "total_duplicates": 2
//! }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::DuplicateFinder;
//! use ccdupe::output::json::JsonOutput;
//! use std::path::Path;
//!
//! let result = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! let output = JsonOutput::new(&result);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanResult};
use crate::error::ErrorKind;

/// A single duplicate group in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonDuplicateGroup {
    /// Paths of all files in the group, in scan order
    pub files: Vec<String>,
    /// BLAKE3 hash as hexadecimal string (64 characters)
    pub hash: String,
}

impl JsonDuplicateGroup {
    /// Convert a confirmed group.
    #[must_use]
    pub fn from_duplicate_group(group: &DuplicateGroup) -> Self {
        Self {
            files: group
                .paths
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect(),
            hash: group.hash_hex(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonOutput {
    /// Confirmed duplicate groups
    pub duplicate_groups: Vec<JsonDuplicateGroup>,
    /// Files that were fingerprinted.
    ///
    /// Links that were not followed are never fingerprinted and are not
    /// counted here, nor are files below the size threshold or files that
    /// could not be read.
    pub total_files: usize,
    /// Sum of group sizes
    pub total_duplicates: usize,
}

impl JsonOutput {
    /// Create a new JSON output from a scan result.
    ///
    /// # Example
    ///
    /// ```
    /// use ccdupe::duplicates::ScanResult;
    /// use ccdupe::output::json::JsonOutput;
    ///
    /// let output = JsonOutput::new(&ScanResult::default());
    /// assert!(output.duplicate_groups.is_empty());
    /// assert_eq!(output.total_duplicates, 0);
    /// ```
    #[must_use]
    pub fn new(result: &ScanResult) -> Self {
        Self {
            duplicate_groups: result
                .groups
                .iter()
                .map(JsonDuplicateGroup::from_duplicate_group)
                .collect(),
            total_files: result.total_files,
            total_duplicates: result.total_duplicates(),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, JsonOutputError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, JsonOutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Arguments
    ///
    /// * `writer` - The writer to output to (e.g., stdout)
    /// * `pretty` - Whether to pretty-print the output
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("Error marshaling JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}

impl JsonOutputError {
    /// Classify this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Serialization(_) => ErrorKind::MarshalFailure,
            Self::Io(e) => ErrorKind::from_io(e),
        }
    }
}

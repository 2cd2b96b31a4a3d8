//! Structured error handling and exit codes.
//!
//! Every module error in the crate (`ResolveError`, `ScanError`,
//! `HashError`, `CompareError`, `DeleteError`, `JsonOutputError`) can be
//! classified into an [`ErrorKind`], which is what log lines, the interactive
//! prompt and the web API report.

use std::fmt;
use std::io;

use serde::Serialize;

/// Exit codes for the ccdupe application.
///
/// - 0: Success (completed normally, with or without duplicates)
/// - 1: General error (usage error or scan failure)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the scan completed.
    Success = 0,
    /// General error: bad usage or the scan root could not be read.
    GeneralError = 1,
    /// Interrupted: scan was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CD000",
            Self::GeneralError => "CD001",
            Self::Interrupted => "CD130",
        }
    }
}

/// Classification shared by all per-file and request-level errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The OS refused access to a file or directory.
    AccessDenied,
    /// The file vanished (e.g. between scan and comparison).
    NotFound,
    /// A symlink in a resolution chain is missing or unreadable.
    BrokenLink,
    /// Symlink resolution exceeded the hop limit.
    LinkCycle,
    /// A read or write failed for a reason other than the above.
    IoFailure,
    /// Structured output could not be serialized.
    MarshalFailure,
}

impl ErrorKind {
    /// Classify an I/O error.
    #[must_use]
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::AccessDenied,
            _ => Self::IoFailure,
        }
    }

    /// Stable lowercase name used in logs and JSON.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessDenied => "access_denied",
            Self::NotFound => "not_found",
            Self::BrokenLink => "broken_link",
            Self::LinkCycle => "link_cycle",
            Self::IoFailure => "io_failure",
            Self::MarshalFailure => "marshal_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

//! File actions module.
//!
//! This module provides functionality for:
//! - Deleting a chosen duplicate, permanently or via the system trash
//! - Walking confirmed groups pair by pair and asking which copy to remove
//!
//! The interactive flow only talks to two capabilities, [`ChoicePrompt`]
//! and [`FileRemover`]. The terminal implementation is
//! [`interactive::TerminalPrompt`]; tests drive the same flow with scripted
//! answers.
//!
//! ```no_run
//! use ccdupe::actions::delete::{delete_file, DeleteConfig};
//! use std::path::Path;
//!
//! let result = delete_file(Path::new("/path/to/duplicate.txt"), &DeleteConfig::default());
//! ```

pub mod delete;
pub mod interactive;

use std::io;
use std::path::{Path, PathBuf};

pub use delete::{delete_file, DeleteConfig, DeleteError, DeleteResult};
pub use interactive::{run_interactive, InteractiveReport, TerminalPrompt};

/// The user's answer for one duplicate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Delete the first file of the pair.
    DeleteFirst,
    /// Delete the second file of the pair.
    DeleteSecond,
    /// Keep both files.
    KeepBoth,
}

/// Something the interactive flow wants the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A duplicate pair is about to be prompted.
    Duplicates(PathBuf, PathBuf),
    /// A file was removed.
    Deleted(PathBuf),
    /// Removing a file failed.
    DeleteFailed(PathBuf, String),
    /// The file was kept because another member of its group is a link to it.
    Refused(PathBuf, PathBuf),
}

/// Presents a pair of duplicates and returns the user's choice.
pub trait ChoicePrompt {
    /// Ask which of two identical files to delete.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt cannot be shown or read.
    fn choose(&mut self, first: &Path, second: &Path) -> io::Result<Choice>;

    /// Show a status line.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn notify(&mut self, notice: &Notice) -> io::Result<()>;
}

/// Removes a file chosen by the user.
pub trait FileRemover {
    /// Delete `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DeleteError`] if the file cannot be removed.
    fn remove(&mut self, path: &Path) -> Result<DeleteResult, DeleteError>;
}

impl FileRemover for DeleteConfig {
    fn remove(&mut self, path: &Path) -> Result<DeleteResult, DeleteError> {
        delete_file(path, self)
    }
}

//! Output formatters for duplicate scan results.
//!
//! Currently a single machine-readable format:
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::duplicates::DuplicateFinder;
//! use ccdupe::output::JsonOutput;
//! use std::path::Path;
//!
//! let result = DuplicateFinder::with_defaults().find_duplicates(Path::new(".")).unwrap();
//! JsonOutput::new(&result).write_to(&mut std::io::stdout(), true).unwrap();
//! ```

pub mod json;

pub use json::{JsonDuplicateGroup, JsonOutput, JsonOutputError};

//! Logging infrastructure for ccdupe.
//!
//! This module provides structured logging using the `log` facade and `env_logger` backend.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Logs go to stderr unless a log file is given, in which case lines are
//! appended to that file instead and stderr stays free for prompts and
//! progress bars.
//!
//! # Example
//!
//! ```rust,no_run
//! use ccdupe::logging::{init_logging, LogOptions};
//! use std::path::PathBuf;
//!
//! init_logging(&LogOptions {
//!     verbose: 1,
//!     log_file: Some(PathBuf::from("ccdupe.log")),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::env;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

/// Logging settings collected from the CLI and configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    /// Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
    pub verbose: u8,
    /// Only show errors (overridden by `RUST_LOG`)
    pub quiet: bool,
    /// Disable ANSI styling
    pub no_color: bool,
    /// Append to this file instead of writing to stderr
    pub log_file: Option<PathBuf>,
}

/// Errors raised while setting up logging.
#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    /// The log file could not be opened for appending.
    #[error("cannot open log file {path}: {source}")]
    OpenFile {
        /// Requested log file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A logger was already installed for this process.
    #[error("logger already initialized: {0}")]
    AlreadyInitialized(#[from] log::SetLoggerError),
}

/// Initialize the logging subsystem.
///
/// Call once at startup, before any logging calls are made.
///
/// # Errors
///
/// Returns [`LoggingError`] if the log file cannot be opened or a logger is
/// already installed.
pub fn init_logging(options: &LogOptions) -> Result<(), LoggingError> {
    let use_env = env::var("RUST_LOG").is_ok();
    let level = determine_level(options.verbose, options.quiet);

    let mut builder = Builder::new();

    if use_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(level);
    }

    match options.log_file {
        Some(ref path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            builder.target(Target::Pipe(Box::new(file)));
            builder.write_style(WriteStyle::Never);
            configure_file_format(&mut builder);
        }
        None => {
            if options.no_color {
                builder.write_style(WriteStyle::Never);
            }
            configure_format(&mut builder, options.verbose);
        }
    }

    builder.try_init()?;

    if use_env {
        log::debug!(
            "Logging initialized from RUST_LOG environment variable: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!("Logging initialized at level: {:?}", level);
    }
    Ok(())
}

/// Determine the log level from CLI flags.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Terminal format; module paths appear from `-v` up.
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let level_style = buf.default_level_style(level);

        if verbose >= 1 {
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                buf.timestamp_seconds(),
                level,
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                level,
                record.args()
            )
        }
    });
}

/// File format: `<timestamp> [LEVEL] message`.
fn configure_file_format(builder: &mut Builder) {
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}",
            buf.timestamp_seconds(),
            record.level(),
            record.args()
        )
    });
}

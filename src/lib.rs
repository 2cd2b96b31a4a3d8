//! ccdupe - Duplicate File Finder
//!
//! Finds byte-identical files under a directory tree. Candidates are
//! bucketed by BLAKE3 fingerprint and every match is confirmed with a
//! chunked byte comparison before anything is reported. Confirmed groups are
//! then resolved interactively, printed as JSON, or served over a small HTTP
//! API.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod web;

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use anyhow::Context;

use crate::actions::{run_interactive, TerminalPrompt};
use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::logging::{init_logging, LoggingError};
use crate::output::JsonOutput;
use crate::progress::Progress;

/// Run the application with parsed arguments.
///
/// Loads the layered configuration, sets up logging, and dispatches to the
/// web server, the JSON report or the interactive cleanup.
///
/// # Errors
///
/// Returns an error if configuration or logging cannot be set up, the scan
/// root is unusable, the scan is interrupted
/// ([`FinderError::Interrupted`](duplicates::FinderError::Interrupted)), or
/// output cannot be written.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(&cli).context("Failed to load configuration")?;

    match init_logging(&config.log_options(&cli)) {
        Ok(()) | Err(LoggingError::AlreadyInitialized(_)) => {}
        Err(e) => return Err(e.into()),
    }

    if cli.web {
        web::run_server(config.web_config())?;
        return Ok(ExitCode::Success);
    }

    let Some(directory) = cli.directory.as_deref() else {
        anyhow::bail!("A directory to scan is required");
    };

    let handler = signal::install_handler()?;
    let quiet = cli.quiet || cli.json;

    let finder_config = FinderConfig::default()
        .with_scan_config(config.scan_config())
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    let result = DuplicateFinder::new(finder_config).find_duplicates(directory)?;

    if cli.json {
        let mut stdout = io::stdout().lock();
        JsonOutput::new(&result).write_to(&mut stdout, true)?;
        stdout.flush()?;
        return Ok(ExitCode::Success);
    }

    if result.groups.is_empty() {
        println!("No duplicates found.");
        return Ok(ExitCode::Success);
    }

    let color = !cli.no_color && io::stdout().is_terminal();
    let mut prompt = TerminalPrompt::stdio(color);
    let mut remover = config.delete_config();
    let report = run_interactive(&result.groups, &mut prompt, &mut remover)?;

    log::info!(
        "Interactive cleanup finished: {} pairs, {} deleted, {} failed, {} kept, {} refused",
        report.pairs_prompted,
        report.deleted.len(),
        report.failed,
        report.kept,
        report.refused
    );

    Ok(ExitCode::Success)
}

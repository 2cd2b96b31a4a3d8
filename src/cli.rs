//! Command-line interface definitions for ccdupe.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # Interactive cleanup of a directory
//! ccdupe ~/Downloads
//!
//! # JSON report, ignoring files under 1 MB
//! ccdupe --json --minsize 1MB ~/Downloads
//!
//! # Compare symlink targets too
//! ccdupe --follow-symlinks ~/Downloads
//!
//! # Start the web API
//! ccdupe --web --bind 0.0.0.0:8080
//! ```

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Duplicate file finder with interactive cleanup and a small web API.
///
/// ccdupe fingerprints files with BLAKE3, confirms every match byte by byte,
/// and then asks which copy of each duplicate pair to delete.
#[derive(Debug, Parser)]
#[command(name = "ccdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory to scan for duplicates
    #[arg(value_name = "DIRECTORY", required_unless_present = "web")]
    pub directory: Option<PathBuf>,

    /// Minimum file size to consider (e.g., 100, 1KB, 1MiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub minsize: Option<u64>,

    /// Follow symbolic links and compare their targets
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Print duplicate groups as JSON instead of prompting
    #[arg(long, conflicts_with = "web")]
    pub json: bool,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Number of I/O threads for hashing and verification (1 = sequential)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Start the web API instead of scanning
    #[arg(long, conflicts_with = "directory")]
    pub web: bool,

    /// Address the web API listens on
    #[arg(long, value_name = "ADDR", requires = "web")]
    pub bind: Option<SocketAddr>,

    /// Configuration file (defaults to config.toml in the platform config dir)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Append log lines to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Parse a human-readable size string into bytes.
///
/// Plain numbers are bytes. Decimal suffixes (`KB`, `MB`, `GB`, `TB`, or
/// just `K`, `M`, `G`, `T`) use powers of 1000; binary suffixes (`KiB`,
/// `MiB`, `GiB`, `TiB`) use powers of 1024. Suffixes are case-insensitive.
///
/// # Errors
///
/// Returns a message if the string is empty, negative, not a number, or has
/// an unknown suffix.
///
/// # Example
///
/// ```
/// use ccdupe::cli::parse_size;
///
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
/// ```
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    // Whole numbers stay exact; fractions go through f64
    if let Ok(whole) = num_str.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Size too large: '{s}'"));
    }

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    Ok((num * multiplier as f64) as u64)
}

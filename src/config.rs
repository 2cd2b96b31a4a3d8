//! Layered configuration.
//!
//! Settings are merged in increasing priority:
//!
//! 1. Built-in defaults
//! 2. A TOML file: `--config <FILE>`, or `config.toml` in the platform
//!    config directory when it exists
//! 3. `CCDUPE_*` environment variables (`CCDUPE_MIN_SIZE=1024`)
//! 4. Command-line flags
//!
//! # Example file
//!
//! ```toml
//! min_size = 4096
//! follow_symlinks = true
//! io_threads = 8
//! trash = true
//! bind = "127.0.0.1:9000"
//! log_file = "/var/log/ccdupe.log"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::DeleteConfig;
use crate::cli::Cli;
use crate::logging::LogOptions;
use crate::scanner::{ScanConfig, DEFAULT_IO_THREADS};
use crate::web::WebConfig;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "CCDUPE_";

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Effective settings after all layers are merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Inclusive minimum file size in bytes
    pub min_size: u64,
    /// Resolve symlinks and compare their targets
    pub follow_symlinks: bool,
    /// Worker threads for hashing and verification
    pub io_threads: usize,
    /// Send deleted files to the trash
    pub trash: bool,
    /// Web API listen address
    pub bind: SocketAddr,
    /// Append logs here instead of stderr
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: 0,
            follow_symlinks: false,
            io_threads: DEFAULT_IO_THREADS,
            trash: false,
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_file: None,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicit `--config` file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer held a value of the wrong type.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),
}

/// Values given on the command line. Unset flags leave lower layers alone.
#[derive(Debug, Default, Serialize)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    min_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    follow_symlinks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    io_threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trash: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bind: Option<SocketAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_file: Option<PathBuf>,
}

impl From<&Cli> for CliOverrides {
    fn from(cli: &Cli) -> Self {
        Self {
            min_size: cli.minsize,
            follow_symlinks: cli.follow_symlinks.then_some(true),
            io_threads: cli.io_threads.map(usize::from),
            trash: cli.trash.then_some(true),
            bind: cli.bind,
            log_file: cli.log_file.clone(),
        }
    }
}

impl Config {
    /// Merge every layer for the given command line.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an explicit config file is missing or any
    /// layer holds an invalid value.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match cli.config {
            Some(ref path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.clone()));
                }
                Some(path.clone())
            }
            None => default_config_path().filter(|path| path.is_file()),
        };

        Self::figment(file.as_deref())
            .merge(Serialized::defaults(CliOverrides::from(cli)))
            .extract()
            .map_err(|e| ConfigError::Invalid(Box::new(e)))
    }

    /// Defaults, the optional file, then the environment.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = file {
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Scanner settings.
    #[must_use]
    pub fn scan_config(&self) -> ScanConfig {
        ScanConfig::default()
            .with_min_size(self.min_size)
            .with_follow_symlinks(self.follow_symlinks)
            .with_io_threads(self.io_threads)
    }

    /// Deletion behavior.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        if self.trash {
            DeleteConfig::trash()
        } else {
            DeleteConfig::permanent()
        }
    }

    /// Web server settings.
    #[must_use]
    pub fn web_config(&self) -> WebConfig {
        WebConfig {
            bind: self.bind,
            delete_config: self.delete_config(),
            io_threads: self.io_threads.max(1),
        }
    }

    /// Logging settings; verbosity flags only exist on the command line.
    #[must_use]
    pub fn log_options(&self, cli: &Cli) -> LogOptions {
        LogOptions {
            verbose: cli.verbose,
            quiet: cli.quiet,
            no_color: cli.no_color,
            log_file: self.log_file.clone(),
        }
    }
}

/// `config.toml` in the platform config directory, e.g.
/// `~/.config/ccdupe/config.toml` on Linux.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "ccdupe", "ccdupe")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

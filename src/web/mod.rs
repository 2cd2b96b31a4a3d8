//! HTTP API for scanning and deleting from a browser.
//!
//! # Routes
//!
//! | Method | Path      | Body                                         | Response                 |
//! |--------|-----------|----------------------------------------------|--------------------------|
//! | POST   | `/scan`   | `{directory, minSize, followSymlinks}`       | `{results, error?}`      |
//! | POST   | `/delete` | `{file}`                                     | `{success, error?}`      |
//! | GET    | `/health` |                                              | `ok`                     |
//!
//! Other methods on `/scan` and `/delete` get `405 Method Not Allowed`.
//!
//! Each scan builds its own [`ScanConfig`](crate::scanner::ScanConfig) from
//! the request and runs on a blocking thread. Scans share a read lock on
//! the filesystem and each deletion takes the write lock, so a file is never
//! removed while a scan is walking or comparing.
//!
//! # Example
//!
//! ```no_run
//! use ccdupe::web::{run_server, WebConfig};
//!
//! run_server(WebConfig::default()).unwrap();
//! ```

pub mod handlers;

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;

use crate::actions::DeleteConfig;
use crate::scanner::DEFAULT_IO_THREADS;

/// Default listen address.
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Server settings.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to listen on
    pub bind: SocketAddr,
    /// How deletions are carried out
    pub delete_config: DeleteConfig,
    /// I/O threads per scan
    pub io_threads: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            delete_config: DeleteConfig::default(),
            io_threads: DEFAULT_IO_THREADS,
        }
    }
}

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Held for reading by scans and for writing by deletions
    pub fs_lock: Arc<RwLock<()>>,
    /// How deletions are carried out
    pub delete_config: DeleteConfig,
    /// I/O threads per scan
    pub io_threads: usize,
}

impl AppState {
    /// Build state from server settings.
    #[must_use]
    pub fn new(config: &WebConfig) -> Self {
        Self {
            fs_lock: Arc::new(RwLock::new(())),
            delete_config: config.delete_config,
            io_threads: config.io_threads,
        }
    }
}

/// Errors that stop the server.
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] io::Error),

    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] io::Error),
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/scan", post(handlers::scan))
        .route("/delete", post(handlers::delete))
        .route("/health", get(handlers::health))
        .with_state(state)
}

/// Serve the API until Ctrl+C.
///
/// Builds its own multi-threaded tokio runtime and blocks the caller.
///
/// # Errors
///
/// Returns [`WebError`] if the runtime cannot start, the address cannot be
/// bound, or the server fails.
pub fn run_server(config: WebConfig) -> Result<(), WebError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(WebError::Runtime)?;

    runtime.block_on(serve(config))
}

async fn serve(config: WebConfig) -> Result<(), WebError> {
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| WebError::Bind {
            addr: config.bind,
            source,
        })?;

    let addr = listener.local_addr().unwrap_or(config.bind);
    println!("Web app launched. Open http://{addr} in your browser.");
    log::info!("Web server started on {}", addr);

    axum::serve(listener, router(AppState::new(&config)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(WebError::Serve)?;

    log::info!("Web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown requested");
}

//! Request and response types plus the route handlers.
//!
//! Request-level problems (malformed JSON, missing fields, an unreadable
//! scan root) are answered with `200 OK` and an `error` field, the shape the
//! browser client expects. Per-file problems during a scan are only logged.

use std::path::PathBuf;

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::actions::delete_file;
use crate::cli::parse_size;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::scanner::ScanConfig;

/// Minimum size as posted by clients: a JSON number or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MinSize {
    /// `"minSize": 1024`
    Number(i64),
    /// `"minSize": "1024"` (or a size with a unit, like `"1KB"`)
    Text(String),
    /// Fractions, out-of-range numbers and other JSON values
    Other(serde_json::Value),
}

impl Default for MinSize {
    fn default() -> Self {
        Self::Number(0)
    }
}

impl MinSize {
    /// The threshold in bytes, or `None` if the value is not a valid size.
    #[must_use]
    pub fn bytes(&self) -> Option<u64> {
        match self {
            Self::Number(n) => u64::try_from(*n).ok(),
            Self::Text(s) if s.trim().is_empty() => Some(0),
            Self::Text(s) => parse_size(s).ok(),
            Self::Other(_) => None,
        }
    }
}

/// Body of `POST /scan`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    /// Root directory to scan
    #[serde(default)]
    pub directory: String,
    /// Inclusive minimum file size
    #[serde(default)]
    pub min_size: MinSize,
    /// Resolve symlinks and compare their targets
    #[serde(default)]
    pub follow_symlinks: bool,
}

/// Response of `POST /scan`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResponse {
    /// One list of paths per duplicate group
    pub results: Vec<Vec<String>>,
    /// Request-level failure, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ScanResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            results: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Body of `POST /delete`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteRequest {
    /// Path of the file to remove
    #[serde(default)]
    pub file: String,
}

/// Response of `POST /delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Whether the file was removed
    pub success: bool,
    /// Why the removal failed
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl DeleteResponse {
    fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

/// `POST /scan`
pub async fn scan(State(state): State<AppState>, body: Bytes) -> Json<ScanResponse> {
    let request: ScanRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected scan request: {}", e);
            return Json(ScanResponse::error(format!("Invalid request format: {e}")));
        }
    };

    if request.directory.trim().is_empty() {
        return Json(ScanResponse::error("Directory path is required"));
    }

    let Some(min_size) = request.min_size.bytes() else {
        return Json(ScanResponse::error("Invalid minimum size value"));
    };

    log::info!(
        "Scan requested: {} (min size {}, follow symlinks: {})",
        request.directory,
        min_size,
        request.follow_symlinks
    );

    let config = FinderConfig::default().with_scan_config(
        ScanConfig::default()
            .with_min_size(min_size)
            .with_follow_symlinks(request.follow_symlinks)
            .with_io_threads(state.io_threads),
    );
    let directory = PathBuf::from(request.directory);

    let _guard = state.fs_lock.read().await;
    let outcome = tokio::task::spawn_blocking(move || {
        DuplicateFinder::new(config).find_duplicates(&directory)
    })
    .await;

    match outcome {
        Ok(Ok(result)) => Json(ScanResponse {
            results: result.path_lists(),
            error: None,
        }),
        Ok(Err(e)) => {
            log::error!("Error scanning directory: {}", e);
            Json(ScanResponse::error(format!("Error scanning directory: {e}")))
        }
        Err(e) => {
            log::error!("Scan task failed: {}", e);
            Json(ScanResponse::error(format!("Error scanning directory: {e}")))
        }
    }
}

/// `POST /delete`
pub async fn delete(State(state): State<AppState>, body: Bytes) -> Json<DeleteResponse> {
    let request: DeleteRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected delete request: {}", e);
            return Json(DeleteResponse::error("Invalid request format"));
        }
    };

    if request.file.trim().is_empty() {
        return Json(DeleteResponse::error("File path is required"));
    }

    // Waits for running scans and other deletions
    let _guard = state.fs_lock.write().await;

    let path = PathBuf::from(&request.file);
    let delete_config = state.delete_config;
    let outcome = tokio::task::spawn_blocking(move || delete_file(&path, &delete_config)).await;

    match outcome {
        Ok(Ok(_)) => {
            log::info!("Deleted file: {}", request.file);
            Json(DeleteResponse {
                success: true,
                error: None,
            })
        }
        Ok(Err(e)) => {
            log::error!("Error deleting file {}: {} ({})", request.file, e, e.kind());
            Json(DeleteResponse::error(format!("Error deleting file: {e}")))
        }
        Err(e) => {
            log::error!("Delete task failed: {}", e);
            Json(DeleteResponse::error(format!("Error deleting file: {e}")))
        }
    }
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ccdupe::web::handlers::{DeleteResponse, ScanResponse};
use ccdupe::web::{router, AppState, WebConfig};
use http_body_util::BodyExt;
use std::fs;
use tempfile::tempdir;
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(&WebConfig::default()))
}

async fn post(app: Router, uri: &str, body: String) -> (StatusCode, Vec<u8>) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, bytes.to_vec())
}

async fn scan(body: serde_json::Value) -> ScanResponse {
    let (status, bytes) = post(app(), "/scan", body.to_string()).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_scan_finds_pair() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    fs::write(dir.path().join("b.txt"), b"hello").unwrap();
    fs::write(dir.path().join("c.txt"), b"world").unwrap();

    let response = scan(serde_json::json!({
        "directory": dir.path(),
        "minSize": "0",
        "followSymlinks": false,
    }))
    .await;

    assert!(response.error.is_none());
    assert_eq!(
        response.results,
        vec![vec![
            dir.path().join("a.txt").display().to_string(),
            dir.path().join("b.txt").display().to_string(),
        ]]
    );
}

#[tokio::test]
async fn test_scan_min_size_number() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"tiny").unwrap();
    fs::write(dir.path().join("b"), b"tiny").unwrap();

    let response = scan(serde_json::json!({"directory": dir.path(), "minSize": 5})).await;

    assert!(response.error.is_none());
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_scan_bad_json() {
    let (status, bytes) = post(app(), "/scan", "{not json".to_string()).await;
    assert_eq!(status, StatusCode::OK);

    let response: ScanResponse = serde_json::from_slice(&bytes).unwrap();
    assert!(response.results.is_empty());
    assert!(response
        .error
        .unwrap()
        .starts_with("Invalid request format"));
}

#[tokio::test]
async fn test_scan_requires_directory() {
    let response = scan(serde_json::json!({"directory": ""})).await;
    assert_eq!(response.error.as_deref(), Some("Directory path is required"));
}

#[tokio::test]
async fn test_scan_invalid_min_size() {
    let dir = tempdir().unwrap();
    let response = scan(serde_json::json!({"directory": dir.path(), "minSize": "lots"})).await;
    assert_eq!(response.error.as_deref(), Some("Invalid minimum size value"));

    let response = scan(serde_json::json!({"directory": dir.path(), "minSize": -3})).await;
    assert_eq!(response.error.as_deref(), Some("Invalid minimum size value"));
}

#[tokio::test]
async fn test_scan_fractional_or_huge_min_size() {
    let dir = tempdir().unwrap();
    let directory = serde_json::to_string(dir.path()).unwrap();

    for min_size in ["1.5", "18446744073709551615"] {
        let body = format!(r#"{{"directory":{directory},"minSize":{min_size}}}"#);
        let (status, bytes) = post(app(), "/scan", body).await;
        let response: ScanResponse = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            response.error.as_deref(),
            Some("Invalid minimum size value"),
            "minSize {min_size}"
        );
    }
}

#[tokio::test]
async fn test_scan_missing_root() {
    let dir = tempdir().unwrap();
    let response = scan(serde_json::json!({"directory": dir.path().join("gone")})).await;

    assert!(response.results.is_empty());
    assert!(response
        .error
        .unwrap()
        .starts_with("Error scanning directory"));
}

#[tokio::test]
async fn test_delete_removes_file() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dup");
    fs::write(&file, b"x").unwrap();

    let body = serde_json::json!({"file": file}).to_string();
    let (status, bytes) = post(app(), "/delete", body).await;
    let response: DeleteResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(response.success);
    assert!(response.error.is_none());
    assert!(!file.exists());
}

#[tokio::test]
async fn test_delete_waits_for_running_scan() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("dup");
    fs::write(&file, b"x").unwrap();

    let state = AppState::new(&WebConfig::default());
    // Stands in for a scan that is still walking the tree
    let scan_guard = state.fs_lock.clone().read_owned().await;

    let app = router(state);
    let body = serde_json::json!({"file": file}).to_string();
    let pending = tokio::spawn(post(app, "/delete", body));

    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    assert!(!pending.is_finished());
    assert!(file.exists());

    drop(scan_guard);
    let (status, bytes) = pending.await.unwrap();
    let response: DeleteResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(response.success);
    assert!(!file.exists());
}

#[tokio::test]
async fn test_scans_share_the_lock() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), b"same").unwrap();
    fs::write(dir.path().join("b"), b"same").unwrap();

    let state = AppState::new(&WebConfig::default());
    let _other_scan = state.fs_lock.clone().read_owned().await;

    let body = serde_json::json!({"directory": dir.path()}).to_string();
    let (_, bytes) = post(router(state), "/scan", body).await;
    let response: ScanResponse = serde_json::from_slice(&bytes).unwrap();

    assert!(response.error.is_none());
    assert_eq!(response.results.len(), 1);
}

#[tokio::test]
async fn test_delete_vanished_file() {
    let dir = tempdir().unwrap();
    let body = serde_json::json!({"file": dir.path().join("already_gone")}).to_string();

    let (status, bytes) = post(app(), "/delete", body).await;
    let response: DeleteResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(status, StatusCode::OK);
    assert!(!response.success);
    assert!(response.error.unwrap().starts_with("Error deleting file"));
}

#[tokio::test]
async fn test_delete_requires_file() {
    let (_, bytes) = post(app(), "/delete", r#"{"file":""}"#.to_string()).await;
    let response: DeleteResponse = serde_json::from_slice(&bytes).unwrap();

    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("File path is required"));
}

#[tokio::test]
async fn test_get_scan_not_allowed() {
    let response = app()
        .oneshot(Request::builder().uri("/scan").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"ok");
}

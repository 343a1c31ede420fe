// Integration tests: HTTP and WebSocket endpoints

use axum_test::TestServer;
use gopanel::cache::CachedQuery;
use gopanel::hub::Hub;
use gopanel::models::{ContainerInfo, MetricsSnapshot, ServiceUnit, SystemInfo};
use gopanel::routes;
use gopanel::store::RetentionStore;
use std::sync::Arc;
use tempfile::TempDir;

mod common;
use common::minimal_snapshot;

async fn test_app() -> (
    axum::Router,
    Arc<Hub>,
    Arc<CachedQuery<Vec<ContainerInfo>>>,
    Arc<RetentionStore>,
    TempDir,
) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("test.db");
    let store = Arc::new(
        RetentionStore::connect(db_path.to_str().unwrap(), 7)
            .await
            .unwrap(),
    );
    store.init().await.unwrap();

    let hub = Arc::new(Hub::new(16));
    let system_info = Arc::new(SystemInfo {
        hostname: "testhost".to_string(),
        ..Default::default()
    });
    let containers: Arc<CachedQuery<Vec<ContainerInfo>>> =
        Arc::new(CachedQuery::new("docker_containers"));
    let services: Arc<CachedQuery<Vec<ServiceUnit>>> =
        Arc::new(CachedQuery::new("systemd_services"));

    let app = routes::app(
        hub.clone(),
        system_info,
        store.clone(),
        containers.clone(),
        services,
    );
    (app, hub, containers, store, dir)
}

/// Build TestServer with http_transport (required for WebSocket tests).
async fn test_server_with_http() -> (TestServer, Arc<Hub>, TempDir) {
    let (app, hub, _, _, dir) = test_app().await;
    let server = TestServer::builder().http_transport().build(app).unwrap();
    (server, hub, dir)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (app, _, _, _, _dir) = test_app().await;
    let server = TestServer::new(app).unwrap();
    let response = server.get("/").await;
    response.assert_status_ok();
    response.assert_text("GoPanel: hello from the Rust port!");
}

#[tokio::test]
async fn test_version_endpoint() {
    let (app, _, _, _, _dir) = test_app().await;
    let server = TestServer::new(app).unwrap();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(json.get("name").and_then(|v| v.as_str()), Some("gopanel"));
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_api_info_returns_identity() {
    let (app, _, _, _, _dir) = test_app().await;
    let server = TestServer::new(app).unwrap();
    let response = server.get("/api/info").await;
    response.assert_status_ok();
    let info: SystemInfo = response.json();
    assert_eq!(info.hostname, "testhost");
}

#[tokio::test]
async fn test_metrics_history_empty_then_populated() {
    let (app, _, _, store, _dir) = test_app().await;
    let server = TestServer::new(app).unwrap();

    let response = server.get("/api/metrics/history").await;
    response.assert_status_ok();
    let records: Vec<MetricsSnapshot> = response.json();
    assert!(records.is_empty());

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs();
    store.append(&minimal_snapshot(now)).await.unwrap();

    let response = server.get("/api/metrics/history?hours=1").await;
    response.assert_status_ok();
    let records: Vec<MetricsSnapshot> = response.json();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].timestamp, now);
}

#[tokio::test]
async fn test_docker_containers_serves_cached_value() {
    let (app, _, containers, _, _dir) = test_app().await;
    let server = TestServer::new(app).unwrap();

    // Before any refresh the cache reports emptiness, not an error.
    let response = server.get("/api/docker/containers").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert!(json.get("value").unwrap().is_null());
    assert!(json.get("error").unwrap().is_null());

    containers
        .refresh(|| async {
            Ok(vec![ContainerInfo {
                id: "abc123".to_string(),
                name: "web".to_string(),
                image: "nginx".to_string(),
                state: "running".to_string(),
                ..Default::default()
            }])
        })
        .await;

    let response = server.get("/api/docker/containers").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json["value"][0]["name"].as_str(),
        Some("web"),
        "cached listing not served"
    );
    assert!(json.get("refreshedAt").unwrap().is_u64());
}

#[tokio::test]
async fn test_services_endpoint_ok() {
    let (app, _, _, _, _dir) = test_app().await;
    let server = TestServer::new(app).unwrap();
    let response = server.get("/api/services").await;
    response.assert_status_ok();
}

// --- WebSocket message tests (require http_transport + ws feature) ---
// Receive until we get JSON matching T (server may send Ping or other frames).

async fn receive_first_json_text<T: serde::de::DeserializeOwned>(
    ws: &mut axum_test::TestWebSocket,
) -> T {
    let deadline = tokio::time::Instant::now() + tokio::time::Duration::from_secs(3);
    loop {
        let text = ws.receive_text().await;
        if let Ok(v) = serde_json::from_str::<T>(&text) {
            return v;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for JSON"
        );
    }
}

#[tokio::test]
async fn test_ws_metrics_sends_welcome_first() {
    let (server, _, _dir) = test_server_with_http().await;
    let mut ws = server
        .get_websocket("/ws/metrics")
        .await
        .into_websocket()
        .await;
    let welcome: serde_json::Value = receive_first_json_text(&mut ws).await;
    assert_eq!(welcome.get("type").and_then(|v| v.as_str()), Some("info"));
    assert_eq!(
        welcome["systemInfo"]["hostname"].as_str(),
        Some("testhost")
    );
}

#[tokio::test]
async fn test_ws_metrics_receives_broadcast_snapshot() {
    let (server, hub, _dir) = test_server_with_http().await;
    let mut ws = server
        .get_websocket("/ws/metrics")
        .await
        .into_websocket()
        .await;
    // Skip the welcome message.
    let _welcome: serde_json::Value = receive_first_json_text(&mut ws).await;

    let hub_clone = hub.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        hub_clone.broadcast(Arc::new(minimal_snapshot(42)));
    });

    let received: MetricsSnapshot = receive_first_json_text(&mut ws).await;
    assert_eq!(received.timestamp, 42);
    assert_eq!(received.memory.used, 512);
}

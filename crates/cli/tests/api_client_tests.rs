#[path = "../src/api_client.rs"]
#[allow(dead_code)] // Some methods are used by the binary but not by tests
mod api_client;

use api_client::ApiClient;
use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;
use std::net::TcpListener;

fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

#[tokio::test]
async fn api_client_success_paths() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    let stats_mock = server.mock(|when, then| {
        when.method(GET).path("/api/admin/cache-stats");
        then.status(200).json_body(json!({
            "hits": 4,
            "misses": 3,
            "keys": 3,
            "ksize": 28,
            "vsize": 2048
        }));
    });

    let clear_one_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/admin/clear-cache")
            .json_body(json!({"type": "faqs"}));
        then.status(200).json_body(json!({
            "success": true,
            "message": "Cache cleared for faqs",
            "timestamp": "2024-01-01T00:00:00Z",
            "hits": 4,
            "misses": 3,
            "keys": 2,
            "ksize": 19,
            "vsize": 1500
        }));
    });

    let health_mock = server.mock(|when, then| {
        when.method(GET).path("/api/health");
        then.status(200)
            .json_body(json!({"status": "ok", "version": "0.1.0"}));
    });

    let client = ApiClient::new(&server.base_url()).unwrap();

    let stats = client.cache_stats().await.unwrap();
    assert_eq!(stats.hits, 4);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.keys, 3);
    assert_eq!(stats.ksize, 28);
    assert_eq!(stats.vsize, 2048);

    let cleared = client.clear_cache(Some("faqs")).await.unwrap();
    assert!(cleared.success);
    assert_eq!(cleared.message, "Cache cleared for faqs");
    assert_eq!(cleared.timestamp, "2024-01-01T00:00:00Z");
    assert_eq!(cleared.stats.keys, 2);

    let health = client.health().await.unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, "0.1.0");

    stats_mock.assert();
    clear_one_mock.assert();
    health_mock.assert();
}

#[tokio::test]
async fn api_client_clear_all_omits_type() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();
    let clear_all_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/api/admin/clear-cache")
            .json_body(json!({}));
        then.status(200).json_body(json!({
            "success": true,
            "message": "All cache cleared",
            "timestamp": "2024-01-01T00:00:00Z",
            "hits": 0,
            "misses": 0,
            "keys": 0,
            "ksize": 0,
            "vsize": 0
        }));
    });

    let client = ApiClient::new(&server.base_url()).unwrap();
    let cleared = client.clear_cache(None).await.unwrap();
    assert_eq!(cleared.message, "All cache cleared");
    clear_all_mock.assert();
}

#[tokio::test]
async fn api_client_returns_error_body_on_failure() {
    if !can_bind_localhost() {
        eprintln!("Skipping httpmock tests: cannot bind to localhost");
        return;
    }

    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/api/admin/clear-cache");
        then.status(400).json_body(json!({
            "code": "bad_request",
            "message": "bad request: unknown resource: widgets"
        }));
    });

    let client = ApiClient::new(&server.base_url()).unwrap();
    let err = client.clear_cache(Some("widgets")).await.unwrap_err();
    assert!(err.to_string().contains("API error (400"));
    assert!(err.to_string().contains("unknown resource"));
}

#[test]
fn api_client_rejects_invalid_url() {
    assert!(ApiClient::new("not a url").is_err());
}

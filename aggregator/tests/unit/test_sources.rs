//! Inventory source tests against a local HTTP server

use std::time::Duration;

use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use daa::errors::AggregatorError;
use daa::source::http::{HttpSource, Options};
use daa::source::SourceProvider;
use secrecy::SecretString;
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn options(url: String, token: Option<&str>) -> Options {
    Options {
        url,
        token: token.map(|t| SecretString::from(t.to_string())),
        timeout: Duration::from_secs(5),
    }
}

async fn inventory_with_token(headers: HeaderMap) -> Result<Json<serde_json::Value>, StatusCode> {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "Bearer inventory-token")
        .unwrap_or(false);
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Json(json!({
        "devices": [
            {"hostname": "tor1", "afk_enabled": true},
            {"hostname": "tor2"}
        ]
    })))
}

#[tokio::test]
async fn test_http_source_fetch() {
    let base = spawn_server(Router::new().route("/export", get(inventory_with_token))).await;
    let url = format!("{}/export", base);
    let source = HttpSource::new(options(url, Some("inventory-token"))).unwrap();

    let inventory = source.fetch().await.unwrap();

    assert_eq!(inventory.devices.len(), 2);
    assert!(inventory.devices[0].afk_enabled);
    assert!(!inventory.devices[1].afk_enabled);
    assert!(source.describe().contains("/export"));
}

#[tokio::test]
async fn test_http_source_error_status() {
    let base = spawn_server(Router::new().route("/export", get(inventory_with_token))).await;
    let source = HttpSource::new(options(format!("{}/export", base), None)).unwrap();

    let result = source.fetch().await;

    match result {
        Err(AggregatorError::SourceError(message)) => assert!(message.contains("401")),
        other => panic!("unexpected result {:?}", other),
    }
}

#[tokio::test]
async fn test_http_source_malformed_body() {
    let base = spawn_server(Router::new().route("/export", get(|| async { "not json" }))).await;
    let source = HttpSource::new(options(format!("{}/export", base), None)).unwrap();

    assert!(matches!(
        source.fetch().await,
        Err(AggregatorError::HttpError(_))
    ));
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! URL fetch tests against a local server

use axum::{http::StatusCode, routing::get, Router};
use insight_node::content::{FetchError, UrlFetcher, DEFAULT_FETCH_TIMEOUT_SECS};
use std::time::Duration;

use crate::common::spawn_server;

fn fetcher() -> UrlFetcher {
    UrlFetcher::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)).unwrap()
}

#[tokio::test]
async fn test_fetch_returns_body_verbatim() {
    let router = Router::new().route(
        "/page",
        get(|| async { "<html><head><title>T</title></head><body>Body text</body></html>" }),
    );
    let addr = spawn_server(router).await;

    let body = fetcher()
        .fetch_text(&format!("http://{}/page", addr))
        .await
        .unwrap();
    assert_eq!(
        body,
        "<html><head><title>T</title></head><body>Body text</body></html>"
    );
}

#[tokio::test]
async fn test_fetch_server_error_status() {
    let router = Router::new().route(
        "/broken",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
    );
    let addr = spawn_server(router).await;
    let url = format!("http://{}/broken", addr);

    let err = fetcher().fetch_text(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::HttpStatus(500, _)));
    assert_eq!(err.to_string(), format!("HTTP 500 for url: {}", url));
}

#[tokio::test]
async fn test_fetch_times_out() {
    let router = Router::new().route(
        "/slow",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "late"
        }),
    );
    let addr = spawn_server(router).await;

    let err = UrlFetcher::new(Duration::from_millis(200))
        .unwrap()
        .fetch_text(&format!("http://{}/slow", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Timeout(_)));
}

#[tokio::test]
async fn test_fetch_rejects_non_http_scheme() {
    let err = fetcher()
        .fetch_text("file:///etc/hostname")
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::InvalidUrl(_, _)));
}

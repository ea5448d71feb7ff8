// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration tests
//!
//! These tests verify that:
//! - /analyze and /summarize accept POST and OPTIONS
//! - Other methods and unknown paths are rejected
//! - CORS headers are present on every response
//! - Oversized uploads are refused

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use insight_node::api::http_server::{create_app, AppState};
use tower::util::ServiceExt; // for `oneshot`

use crate::common::{multipart_request, png_bytes, Part};

#[tokio::test]
async fn test_options_returns_ok() {
    for uri in ["/analyze", "/summarize"] {
        let app = create_app(AppState::new_for_test());
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri(uri)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "OPTIONS {}", uri);
    }
}

#[tokio::test]
async fn test_cors_preflight() {
    let app = create_app(AppState::new_for_test());
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/summarize")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_cors_header_on_error_response() {
    let app = create_app(AppState::new_for_test());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/analyze")
        .header(header::ORIGIN, "http://example.org")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response
        .headers()
        .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_get_not_allowed() {
    let app = create_app(AppState::new_for_test());
    let request = Request::builder()
        .method(Method::GET)
        .uri("/analyze")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = create_app(AppState::new_for_test());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/v1/generate")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_over_limit() {
    let mut state = AppState::new_for_test();
    state.max_upload_bytes = 1024;
    let app = create_app(state);

    let png = png_bytes(256, 256);
    let noisy: Vec<u8> = png.iter().chain(vec![7u8; 4096].iter()).copied().collect();
    let request = multipart_request(
        "/analyze",
        &[Part::File {
            name: "image",
            filename: "big.png",
            bytes: &noisy,
        }],
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_urlencoded_over_limit() {
    let mut state = AppState::new_for_test();
    state.max_upload_bytes = 64;
    let app = create_app(state);

    let body = format!("url=http%3A%2F%2Fexample.com%2F{}", "a".repeat(4096));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/summarize")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Summarize endpoint tests for POST /summarize
//!
//! These tests verify that:
//! - PDF and .docx uploads are extracted and summarized
//! - A file takes precedence over a URL
//! - URL bodies are fetched verbatim and fetch failures are client errors
//! - Empty extractions and summarizer failures map to the right status

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Html,
    routing::get,
    Router,
};
use insight_node::{
    api::http_server::{create_app, AppState},
    models::{ModelManager, StubCaptioner, StubDetector, StubSummarizer},
};
use std::sync::Arc;

use crate::common::{docx_bytes, multipart_request, pdf_bytes, send, spawn_server, Part};

const ARTICLE: &str = "<html><body><p>alpha beta gamma delta epsilon zeta eta theta</p></body></html>";

fn urlencoded_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/summarize")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn spawn_article_server() -> String {
    let router = Router::new().route("/article", get(|| async { Html(ARTICLE) }));
    let addr = spawn_server(router).await;
    format!("http://{}/article", addr)
}

#[tokio::test]
async fn test_summarize_no_input() {
    let app = create_app(AppState::new_for_test());
    let request = multipart_request(
        "/summarize",
        &[Part::Text {
            name: "note",
            value: "nothing here",
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file or URL provided");
}

#[tokio::test]
async fn test_summarize_unsupported_file_type() {
    let app = create_app(AppState::new_for_test());
    let request = multipart_request(
        "/summarize",
        &[Part::File {
            name: "file",
            filename: "notes.txt",
            bytes: b"plain text is not accepted",
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported file type");
}

#[tokio::test]
async fn test_summarize_file_wins_over_url() {
    let app = create_app(AppState::new_for_test());
    let request = multipart_request(
        "/summarize",
        &[
            Part::File {
                name: "file",
                filename: "notes.txt",
                bytes: b"plain",
            },
            Part::Text {
                name: "url",
                value: "http://127.0.0.1:1/unused",
            },
        ],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unsupported file type");
}

#[tokio::test]
async fn test_summarize_pdf() {
    let app = create_app(AppState::new_for_test());
    let pdf = pdf_bytes(&["first page words here", "second page words here"]);
    let request = multipart_request(
        "/summarize",
        &[Part::File {
            name: "file",
            filename: "Report.PDF",
            bytes: &pdf,
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_object().unwrap().len(), 1);
    let summary = body["summary"].as_str().unwrap();
    assert!(summary.starts_with("first page"));
    assert!(!summary.contains("second"));
}

#[tokio::test]
async fn test_summarize_blank_pdf() {
    let app = create_app(AppState::new_for_test());
    let pdf = pdf_bytes(&["", ""]);
    let request = multipart_request(
        "/summarize",
        &[Part::File {
            name: "file",
            filename: "scan.pdf",
            bytes: &pdf,
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No text extracted");
}

#[tokio::test]
async fn test_summarize_corrupt_pdf() {
    let app = create_app(AppState::new_for_test());
    let request = multipart_request(
        "/summarize",
        &[Part::File {
            name: "file",
            filename: "broken.pdf",
            bytes: b"%PDF-1.4 truncated garbage",
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to extract text"));
}

#[tokio::test]
async fn test_summarize_docx() {
    let app = create_app(AppState::new_for_test());
    let docx = docx_bytes(&["The quarterly results were strong.", "Revenue grew in every region."]);
    let request = multipart_request(
        "/summarize",
        &[Part::File {
            name: "file",
            filename: "memo.docx",
            bytes: &docx,
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "The quarterly results were strong.");
}

#[tokio::test]
async fn test_summarize_url_keeps_markup() {
    let url = spawn_article_server().await;
    let app = create_app(AppState::new_for_test());
    let request = multipart_request(
        "/summarize",
        &[Part::Text {
            name: "url",
            value: &url,
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    let summary = body["summary"].as_str().unwrap();
    assert!(summary.starts_with("<html><body><p>alpha"));
}

#[tokio::test]
async fn test_summarize_urlencoded_url() {
    let url = spawn_article_server().await;
    let app = create_app(AppState::new_for_test());
    let encoded: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("url", &url)
        .finish();

    let (status, body) = send(app, urlencoded_request(&encoded)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["summary"].as_str().unwrap().contains("alpha"));
}

#[tokio::test]
async fn test_summarize_url_not_found() {
    let addr = spawn_server(Router::new()).await;
    let app = create_app(AppState::new_for_test());
    let url = format!("http://{}/missing", addr);
    let request = multipart_request(
        "/summarize",
        &[Part::Text {
            name: "url",
            value: &url,
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("URL fetch failed"));
    assert!(error.contains("404"));
}

#[tokio::test]
async fn test_summarize_empty_url_field() {
    let app = create_app(AppState::new_for_test());

    let (status, body) = send(app, urlencoded_request("url=")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("URL fetch failed"));
}

#[tokio::test]
async fn test_summarize_model_failure() {
    let state = AppState::with_models_for_test(ModelManager::new(
        Arc::new(StubDetector::halves()),
        Arc::new(StubCaptioner::new()),
        Arc::new(StubSummarizer::failing("model offline")),
    ));
    let app = create_app(state);
    let docx = docx_bytes(&["Some text to summarize."]);
    let request = multipart_request(
        "/summarize",
        &[Part::File {
            name: "file",
            filename: "memo.docx",
            bytes: &docx,
        }],
    );

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Summarization failed: model offline");
}

#[tokio::test]
async fn test_summarize_is_repeatable() {
    let state = AppState::new_for_test();
    let docx = docx_bytes(&["one two three four five six"]);

    let mut summaries = Vec::new();
    for _ in 0..2 {
        let request = multipart_request(
            "/summarize",
            &[Part::File {
                name: "file",
                filename: "same.docx",
                bytes: &docx,
            }],
        );
        let (status, body) = send(create_app(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        summaries.push(body["summary"].clone());
    }

    assert_eq!(summaries[0], summaries[1]);
    assert_eq!(summaries[0], "one two three");
}

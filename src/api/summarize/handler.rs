// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summarize endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, error, info, warn};

use super::request::{SummarizeRequest, SummarizeSource};
use super::response::SummarizeResponse;
use crate::api::errors::ApiError;
use crate::api::form::FormData;
use crate::api::http_server::AppState;
use crate::content::extract_text;

/// POST /summarize - Summarize a document or web page
///
/// # Request
/// Multipart or URL-encoded form with either:
/// - `file`: a `.pdf` or `.docx` upload (takes precedence)
/// - `url`: a page to fetch; its body is used verbatim
///
/// # Response
/// - `summary`: Abstractive summary (40-150 tokens)
///
/// # Errors
/// - 400 Bad Request: No input, unsupported file type, unreadable document,
///   fetch failure, or no text extracted
/// - 500 Internal Server Error: Summarization failed
pub async fn summarize_handler(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let request = SummarizeRequest::from_form(form).map_err(|e| {
        warn!("Summarize validation failed: {}", e);
        e
    })?;

    let text = match request.source {
        SummarizeSource::Document { kind, file } => {
            debug!(
                "Extracting {} text from '{}' ({} bytes)",
                kind.as_str(),
                file.filename,
                file.bytes.len()
            );
            let bytes = file.bytes;
            tokio::task::spawn_blocking(move || extract_text(kind, &bytes))
                .await
                .map_err(|e| {
                    error!("Text extraction task failed: {}", e);
                    ApiError::InternalError(format!("Text extraction failed: {}", e))
                })?
                .map_err(|e| {
                    warn!("Failed to extract text from '{}': {}", file.filename, e);
                    ApiError::InvalidRequest(format!("Failed to extract text: {}", e))
                })?
        }
        SummarizeSource::Url(url) => state.fetcher.fetch_text(&url).await.map_err(|e| {
            warn!("URL fetch failed for {}: {}", url, e);
            ApiError::InvalidRequest(format!("URL fetch failed: {}", e))
        })?,
    };

    if text.trim().is_empty() {
        return Err(ApiError::InvalidRequest("No text extracted".to_string()));
    }

    debug!("Summarizing {} chars", text.len());

    let summary = state
        .models
        .summarizer()
        .summarize(&text, &state.summary_params)
        .await
        .map_err(|e| {
            error!("Summarization failed: {:?}", e);
            ApiError::InternalError(format!("Summarization failed: {:#}", e))
        })?;

    info!(
        "Summarize complete: {} chars -> {} chars",
        text.len(),
        summary.len()
    );

    Ok(Json(SummarizeResponse { summary }))
}

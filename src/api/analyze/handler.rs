// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze endpoint handler

use axum::{extract::State, Json};
use tracing::{debug, error, info, warn};

use super::request::AnalyzeRequest;
use super::response::AnalyzeResponse;
use crate::api::errors::ApiError;
use crate::api::form::FormData;
use crate::api::http_server::AppState;
use crate::vision::{decode_image_bytes, encode_png_base64};

/// POST /analyze - Detect objects and caption an image
///
/// # Request
/// Multipart form with the image file under `image`.
///
/// # Response
/// - `caption`: One-sentence description, or `"Caption generation failed: ..."`
/// - `detections`: `{label, confidence, bbox}` per object, highest confidence first
/// - `annotated_image`: Base64 PNG of the image with any boxes drawn
///
/// # Errors
/// - 400 Bad Request: No image part, or bytes that are not an image
/// - 500 Internal Server Error: Detection or annotation encoding failed
///   (body still carries the caption)
pub async fn analyze_handler(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let request = AnalyzeRequest::from_form(form).map_err(|e| {
        warn!("Analyze validation failed: {}", e);
        e
    })?;

    let (image, image_info) = decode_image_bytes(&request.image.bytes).map_err(|e| {
        warn!("Failed to decode image '{}': {}", request.image.filename, e);
        ApiError::InvalidRequest(format!("Unsupported image type: {}", e))
    })?;

    debug!(
        "Decoded image: {}x{} {:?}, {} bytes",
        image_info.width, image_info.height, image_info.format, image_info.size_bytes
    );

    let detector = state.models.detector();
    let captioner = state.models.captioner();
    let (detection, caption) = tokio::join!(detector.detect(&image), captioner.caption(&image));

    let caption = caption.unwrap_or_else(|e| {
        warn!("Caption generation failed: {:#}", e);
        format!("Caption generation failed: {:#}", e)
    });

    let output = detection.map_err(|e| {
        error!("Detection failed: {:?}", e);
        ApiError::DetectionFailed {
            caption: caption.clone(),
            message: format!("Detection failed: {:#}", e),
        }
    })?;

    let annotated_image = encode_png_base64(&output.annotated).map_err(|e| {
        error!("Failed to encode annotated image: {}", e);
        ApiError::DetectionFailed {
            caption: caption.clone(),
            message: format!("Detection failed: {}", e),
        }
    })?;

    info!(
        "Analyze complete: {} detections, caption '{}'",
        output.detections.len(),
        caption
    );

    Ok(Json(AnalyzeResponse::new(
        caption,
        &output.detections,
        annotated_image,
    )))
}

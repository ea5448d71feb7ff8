// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP error mapping
//!
//! Every failure leaves the service as `{"error": "<message>"}` with the
//! matching status. A detection failure on `/analyze` additionally carries
//! the caption and empty result fields.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;

/// Body of every plain error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Missing or unusable input (400)
    InvalidRequest(String),
    /// Body exceeded the upload limit (413)
    PayloadTooLarge(String),
    /// Model or server failure (500)
    InternalError(String),
    /// Detector failed after captioning ran (500)
    DetectionFailed { caption: String, message: String },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalError(_) | ApiError::DetectionFailed { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::InvalidRequest(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::InternalError(msg) => msg,
            ApiError::DetectionFailed { message, .. } => message,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.message().to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            ApiError::DetectionFailed { caption, message } => (
                status,
                Json(json!({
                    "caption": caption,
                    "detections": [],
                    "annotated_image": null,
                    "error": message,
                })),
            )
                .into_response(),
            other => (status, Json(other.to_response())).into_response(),
        }
    }
}

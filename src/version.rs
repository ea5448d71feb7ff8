// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the Insight Node

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Endpoints served by this build
pub const ENDPOINTS: &[&str] = &["POST /analyze", "POST /summarize"];

/// Capabilities in this version
pub const FEATURES: &[&str] = &[
    "object-detection",
    "image-captioning",
    "annotated-images",
    "pdf-summarization",
    "docx-summarization",
    "url-summarization",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Insight Node {}", VERSION_NUMBER)
}

/// Get full version info
pub fn get_version_info() -> serde_json::Value {
    serde_json::json!({
        "version": VERSION_NUMBER,
        "endpoints": ENDPOINTS,
        "features": FEATURES,
    })
}

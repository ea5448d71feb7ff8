// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze response types

use serde::{Deserialize, Serialize};

use crate::models::Detection;

/// Response from image analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Caption, or a failure placeholder
    pub caption: String,
    /// Detections with confidence and bbox rounded to 2 decimals
    pub detections: Vec<Detection>,
    /// Base64 PNG of the input with boxes drawn
    pub annotated_image: String,
}

impl AnalyzeResponse {
    pub fn new(caption: String, detections: &[Detection], annotated_image: String) -> Self {
        Self {
            caption,
            detections: detections.iter().map(Detection::rounded).collect(),
            annotated_image,
        }
    }
}

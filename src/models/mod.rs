// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model capabilities used by the HTTP handlers
//!
//! The three pretrained models (detector, captioner, summarizer) are reached
//! only through the traits below. Real implementations live in
//! `crate::vision` and `crate::summarization`; deterministic stand-ins live in
//! [`stub`].

pub mod generation;
pub mod manager;
pub mod stub;

use anyhow::Result;
use async_trait::async_trait;
use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};

pub use manager::{ModelConfig, ModelManager};
pub use stub::{StubCaptioner, StubDetector, StubSummarizer};

/// One located object instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Class label (e.g. "person")
    pub label: String,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    /// Bounding box as [x1, y1, x2, y2] in source image pixels
    pub bbox: [f32; 4],
}

impl Detection {
    pub fn new(label: impl Into<String>, confidence: f32, bbox: [f32; 4]) -> Self {
        Self {
            label: label.into(),
            confidence,
            bbox,
        }
    }

    /// Copy with confidence and coordinates rounded to 2 decimal places
    pub fn rounded(&self) -> Self {
        Self {
            label: self.label.clone(),
            confidence: round2(self.confidence),
            bbox: self.bbox.map(round2),
        }
    }
}

/// Round to 2 decimal places
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

/// Output of a single detector pass
#[derive(Debug, Clone)]
pub struct DetectionOutput {
    /// Detections in detector emission order
    pub detections: Vec<Detection>,
    /// Input image with boxes and labels drawn; a plain copy when nothing was found
    pub annotated: RgbImage,
}

/// Generation parameters for the summarizer
///
/// Decoding is always deterministic; there is no sampling switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryParams {
    /// Minimum summary length in tokens
    pub min_length: usize,
    /// Maximum summary length in tokens
    pub max_length: usize,
}

impl Default for SummaryParams {
    fn default() -> Self {
        Self {
            min_length: 40,
            max_length: 150,
        }
    }
}

/// Locates objects in an image
#[async_trait]
pub trait ObjectDetector: Send + Sync {
    /// Run detection and render the annotated copy
    async fn detect(&self, image: &DynamicImage) -> Result<DetectionOutput>;

    /// Model name for logging
    fn name(&self) -> &str;
}

/// Produces a one-sentence description of an image
#[async_trait]
pub trait ImageCaptioner: Send + Sync {
    async fn caption(&self, image: &DynamicImage) -> Result<String>;

    fn name(&self) -> &str;
}

/// Produces an abridged version of a text
#[async_trait]
pub trait TextSummarizer: Send + Sync {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String>;

    fn name(&self) -> &str;
}

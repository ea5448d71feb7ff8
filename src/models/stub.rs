// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Deterministic stand-ins for the pretrained models
//!
//! Used by the integration tests and by `--stub-models` smoke runs. Every
//! stub returns the same output for the same input.

use anyhow::Result;
use async_trait::async_trait;
use image::DynamicImage;

use super::{
    Detection, DetectionOutput, ImageCaptioner, ObjectDetector, SummaryParams, TextSummarizer,
};
use crate::vision::annotate::Annotator;

/// Detector that reports a fixed set of boxes, clipped to the image
pub struct StubDetector {
    detections: Vec<Detection>,
    failure: Option<String>,
    annotator: Annotator,
}

impl StubDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            failure: None,
            annotator: Annotator::default(),
        }
    }

    /// A detector whose every call fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            detections: Vec::new(),
            failure: Some(message.to_string()),
            annotator: Annotator::default(),
        }
    }

    /// Two fixed detections covering the left and right halves of the image
    pub fn halves() -> Self {
        Self::new(vec![
            Detection::new("person", 0.87654, [0.0, 0.0, 0.5, 1.0]),
            Detection::new("dog", 0.51234, [0.5, 0.25, 1.0, 0.75]),
        ])
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::halves()
    }
}

#[async_trait]
impl ObjectDetector for StubDetector {
    async fn detect(&self, image: &DynamicImage) -> Result<DetectionOutput> {
        if let Some(ref message) = self.failure {
            anyhow::bail!("{}", message);
        }

        // Stub boxes are expressed as fractions of the image size
        let (w, h) = (image.width() as f32, image.height() as f32);
        let detections: Vec<Detection> = self
            .detections
            .iter()
            .map(|d| Detection {
                label: d.label.clone(),
                confidence: d.confidence,
                bbox: [d.bbox[0] * w, d.bbox[1] * h, d.bbox[2] * w, d.bbox[3] * h],
            })
            .collect();

        let annotated = self.annotator.render(image, &detections);

        Ok(DetectionOutput {
            detections,
            annotated,
        })
    }

    fn name(&self) -> &str {
        "stub-detector"
    }
}

/// Captioner that describes the image by its dimensions
pub struct StubCaptioner {
    failure: Option<String>,
}

impl StubCaptioner {
    pub fn new() -> Self {
        Self { failure: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
        }
    }
}

impl Default for StubCaptioner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageCaptioner for StubCaptioner {
    async fn caption(&self, image: &DynamicImage) -> Result<String> {
        if let Some(ref message) = self.failure {
            anyhow::bail!("{}", message);
        }
        Ok(format!(
            "a picture of size {}x{}",
            image.width(),
            image.height()
        ))
    }

    fn name(&self) -> &str {
        "stub-captioner"
    }
}

/// Summarizer that keeps the leading half of the words, capped at `max_length`
pub struct StubSummarizer {
    failure: Option<String>,
}

impl StubSummarizer {
    pub fn new() -> Self {
        Self { failure: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
        }
    }
}

impl Default for StubSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextSummarizer for StubSummarizer {
    async fn summarize(&self, text: &str, params: &SummaryParams) -> Result<String> {
        if let Some(ref message) = self.failure {
            anyhow::bail!("{}", message);
        }

        let words: Vec<&str> = text.split_whitespace().collect();
        let keep = (words.len() / 2).max(1).min(params.max_length);
        Ok(words[..keep.min(words.len())].join(" "))
    }

    fn name(&self) -> &str {
        "stub-summarizer"
    }
}

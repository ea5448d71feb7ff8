// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Model manager holding the three loaded models
//!
//! Models are loaded once at process start and shared read-only by every
//! request.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use super::{
    ImageCaptioner, ObjectDetector, StubCaptioner, StubDetector, StubSummarizer, TextSummarizer,
};
use crate::summarization::BartSummarizer;
use crate::vision::caption::BlipCaptioner;
use crate::vision::detection::{DetectionParams, YoloDetector};

/// Configuration for loading models
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Directory containing the YOLO detector export
    pub detection_model_dir: String,
    /// Directory containing the BLIP captioner export
    pub caption_model_dir: String,
    /// Directory containing the BART summarizer export
    pub summarization_model_dir: String,
    /// Detector thresholds and input size
    pub detection: DetectionParams,
    /// Maximum caption length in tokens
    pub caption_max_tokens: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            detection_model_dir: "./models/yolov8n-onnx".to_string(),
            caption_model_dir: "./models/blip-image-captioning-base-onnx".to_string(),
            summarization_model_dir: "./models/bart-large-cnn-onnx".to_string(),
            detection: DetectionParams::default(),
            caption_max_tokens: 20,
        }
    }
}

/// Holds the detector, captioner and summarizer behind their capability traits
#[derive(Clone)]
pub struct ModelManager {
    detector: Arc<dyn ObjectDetector>,
    captioner: Arc<dyn ImageCaptioner>,
    summarizer: Arc<dyn TextSummarizer>,
}

impl ModelManager {
    /// Assemble a manager from already-constructed models
    pub fn new(
        detector: Arc<dyn ObjectDetector>,
        captioner: Arc<dyn ImageCaptioner>,
        summarizer: Arc<dyn TextSummarizer>,
    ) -> Self {
        Self {
            detector,
            captioner,
            summarizer,
        }
    }

    /// Load all three ONNX models
    ///
    /// Any model that fails to load aborts startup.
    pub async fn load(config: &ModelConfig) -> Result<Self> {
        let detector = YoloDetector::new(&config.detection_model_dir, config.detection)
            .await
            .with_context(|| {
                format!(
                    "Failed to load detection model from {}",
                    config.detection_model_dir
                )
            })?;
        info!("✅ Detection model loaded from {}", config.detection_model_dir);

        let captioner = BlipCaptioner::new(&config.caption_model_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to load caption model from {}",
                    config.caption_model_dir
                )
            })?
            .with_max_tokens(config.caption_max_tokens);
        info!("✅ Caption model loaded from {}", config.caption_model_dir);

        let summarizer = BartSummarizer::new(&config.summarization_model_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to load summarization model from {}",
                    config.summarization_model_dir
                )
            })?;
        info!(
            "✅ Summarization model loaded from {}",
            config.summarization_model_dir
        );

        Ok(Self::new(
            Arc::new(detector),
            Arc::new(captioner),
            Arc::new(summarizer),
        ))
    }

    /// Deterministic stand-ins for every model
    pub fn stub() -> Self {
        Self::new(
            Arc::new(StubDetector::default()),
            Arc::new(StubCaptioner::default()),
            Arc::new(StubSummarizer::default()),
        )
    }

    pub fn detector(&self) -> Arc<dyn ObjectDetector> {
        self.detector.clone()
    }

    pub fn captioner(&self) -> Arc<dyn ImageCaptioner> {
        self.captioner.clone()
    }

    pub fn summarizer(&self) -> Arc<dyn TextSummarizer> {
        self.summarizer.clone()
    }

    /// Names of the loaded models, for the startup banner
    pub fn model_names(&self) -> Vec<String> {
        vec![
            self.detector.name().to_string(),
            self.captioner.name().to_string(),
            self.summarizer.name().to_string(),
        ]
    }
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("detector", &self.detector.name())
            .field("captioner", &self.captioner.name())
            .field("summarizer", &self.summarizer.name())
            .finish()
    }
}

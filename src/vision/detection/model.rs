// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 detector backed by ONNX Runtime
//!
//! Expects a directory holding `model.onnx` or `yolov8n.onnx` (an Ultralytics
//! export with a single `[1, 3, S, S]` input) and optionally `labels.txt`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::DynamicImage;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use super::labels::LabelMap;
use super::postprocess::{decode_output, non_max_suppression, scale_to_source};
use super::preprocessing::preprocess_for_detection;
use super::DetectionParams;
use crate::models::{Detection, DetectionOutput, ObjectDetector};
use crate::vision::annotate::Annotator;

const MODEL_FILES: &[&str] = &["model.onnx", "yolov8n.onnx"];
const LABELS_FILE: &str = "labels.txt";

/// YOLOv8 object detector
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    input_name: String,
    labels: Arc<LabelMap>,
    annotator: Arc<Annotator>,
    params: DetectionParams,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("classes", &self.labels.len())
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from `model_dir`
    ///
    /// # Errors
    /// Returns error if no model file is present, or if
    /// ONNX Runtime rejects the model.
    pub async fn new<P: AsRef<Path>>(model_dir: P, params: DetectionParams) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let model_path = MODEL_FILES
            .iter()
            .map(|name| model_dir.join(name))
            .find(|path| path.exists())
            .ok_or_else(|| {
                anyhow::anyhow!("Detection model not found in {}", model_dir.display())
            })?;

        info!("Loading detection model from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(&model_path)
            .with_context(|| {
                format!("Failed to load detection model from {}", model_path.display())
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        let labels = LabelMap::load_or_default(&model_dir.join(LABELS_FILE))?;
        debug!(
            "Detection model input: {}, {} classes",
            input_name,
            labels.len()
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            labels: Arc::new(labels),
            annotator: Arc::new(Annotator::with_system_font()),
            params,
        })
    }

    /// Run detection synchronously
    ///
    /// Detections come back sorted by confidence, highest first.
    pub fn detect_blocking(&self, image: &DynamicImage) -> Result<DetectionOutput> {
        let (tensor, letterbox) = preprocess_for_detection(image, self.params.input_size);

        let mut candidates = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow::anyhow!("Detection session lock poisoned"))?;

            let input_value =
                Value::from_array(tensor).context("Failed to create input tensor")?;
            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract detection output")?;
            debug!("Detection output shape: {:?}", output.shape());

            decode_output(&output.view(), self.params.conf_threshold)?
        };

        scale_to_source(&mut candidates, &letterbox);
        let kept = non_max_suppression(
            candidates,
            self.params.iou_threshold,
            self.params.max_detections,
        );

        let detections: Vec<Detection> = kept
            .iter()
            .map(|b| Detection::new(self.labels.name(b.class_id), b.score, b.xyxy))
            .collect();

        debug!("Detected {} objects", detections.len());

        let annotated = self.annotator.render(image, &detections);

        Ok(DetectionOutput {
            detections,
            annotated,
        })
    }
}

#[async_trait]
impl ObjectDetector for YoloDetector {
    async fn detect(&self, image: &DynamicImage) -> Result<DetectionOutput> {
        let detector = self.clone();
        let image = image.clone();
        tokio::task::spawn_blocking(move || detector.detect_blocking(&image))
            .await
            .context("Detection task panicked")?
    }

    fn name(&self) -> &str {
        "yolov8n"
    }
}

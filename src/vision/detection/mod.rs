// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv8 object detection
//!
//! Letterbox preprocessing, ONNX inference, confidence filtering and
//! class-aware NMS. Boxes are reported in source image pixels.

pub mod labels;
pub mod model;
pub mod postprocess;
pub mod preprocessing;

pub use labels::{LabelMap, COCO_LABELS};
pub use model::YoloDetector;
pub use postprocess::{decode_output, iou, non_max_suppression, scale_to_source, RawBox};
pub use preprocessing::{letterbox, preprocess_for_detection, Letterbox, DETECTION_INPUT_SIZE};

/// Detector thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    /// Square model input size
    pub input_size: u32,
    /// Minimum class score kept
    pub conf_threshold: f32,
    /// Overlap above which a lower-scoring box of the same class is dropped
    pub iou_threshold: f32,
    /// Cap on detections per image
    pub max_detections: usize,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            input_size: DETECTION_INPUT_SIZE,
            conf_threshold: 0.25,
            iou_threshold: 0.7,
            max_detections: 300,
        }
    }
}

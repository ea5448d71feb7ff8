// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decoding of raw YOLOv8 output into boxes
//!
//! YOLOv8 exports emit a `[1, 4 + num_classes, num_anchors]` tensor: rows
//! 0-3 are box center x, center y, width, height in input space, the
//! remaining rows are per-class scores.

use anyhow::Context;
use ndarray::{ArrayViewD, Ix3};

use super::preprocessing::Letterbox;

/// A candidate box before labels are attached
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawBox {
    /// [x1, y1, x2, y2]
    pub xyxy: [f32; 4],
    pub score: f32,
    pub class_id: usize,
}

impl RawBox {
    pub fn area(&self) -> f32 {
        (self.xyxy[2] - self.xyxy[0]).max(0.0) * (self.xyxy[3] - self.xyxy[1]).max(0.0)
    }
}

/// Intersection over union of two boxes
pub fn iou(a: &RawBox, b: &RawBox) -> f32 {
    let x1 = a.xyxy[0].max(b.xyxy[0]);
    let y1 = a.xyxy[1].max(b.xyxy[1]);
    let x2 = a.xyxy[2].min(b.xyxy[2]);
    let y2 = a.xyxy[3].min(b.xyxy[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Decode the output tensor into candidate boxes above `conf_threshold`
///
/// Boxes are returned in input (letterboxed) space.
pub fn decode_output(output: &ArrayViewD<f32>, conf_threshold: f32) -> anyhow::Result<Vec<RawBox>> {
    let shape = output.shape();
    if shape.len() != 3 || shape[0] != 1 || shape[1] <= 4 {
        anyhow::bail!(
            "Unexpected detector output shape: {:?}, expected [1, 4 + classes, anchors]",
            shape
        );
    }

    let (rows, anchors) = (shape[1], shape[2]);
    let output = output
        .view()
        .into_dimensionality::<Ix3>()
        .context("Detector output is not three-dimensional")?;
    let mut candidates = Vec::new();

    for a in 0..anchors {
        let mut best_class = 0;
        let mut best_score = f32::MIN;
        for c in 4..rows {
            let score = output[[0, c, a]];
            if score > best_score {
                best_score = score;
                best_class = c - 4;
            }
        }

        if best_score < conf_threshold {
            continue;
        }

        let cx = output[[0, 0, a]];
        let cy = output[[0, 1, a]];
        let w = output[[0, 2, a]];
        let h = output[[0, 3, a]];

        candidates.push(RawBox {
            xyxy: [cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0],
            score: best_score,
            class_id: best_class,
        });
    }

    Ok(candidates)
}

/// Class-aware non-maximum suppression
///
/// Keeps the highest scoring box among overlapping boxes of the same class.
/// Output is sorted by score, descending, and capped at `max_detections`.
pub fn non_max_suppression(
    mut candidates: Vec<RawBox>,
    iou_threshold: f32,
    max_detections: usize,
) -> Vec<RawBox> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<RawBox> = Vec::new();
    for candidate in candidates {
        if kept.len() >= max_detections {
            break;
        }
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}

/// Map boxes from letterboxed input space to source image pixels
pub fn scale_to_source(boxes: &mut [RawBox], letterbox: &Letterbox) {
    for b in boxes.iter_mut() {
        let (x1, y1) = letterbox.to_source(b.xyxy[0], b.xyxy[1]);
        let (x2, y2) = letterbox.to_source(b.xyxy[2], b.xyxy[3]);
        b.xyxy = [x1, y1, x2, y2];
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the `/analyze` endpoint
//!
//! This module provides:
//! - Object detection via YOLOv8
//! - Image captioning via BLIP
//! - Annotation rendering and image encode/decode helpers
//!
//! All inference runs on CPU.

pub mod annotate;
pub mod caption;
pub mod detection;
pub mod image_utils;

pub use annotate::Annotator;
pub use caption::BlipCaptioner;
pub use detection::{DetectionParams, YoloDetector};
pub use image_utils::{decode_image_bytes, detect_format, encode_png_base64, ImageError, ImageInfo};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod content;
pub mod models;
pub mod summarization;
pub mod version;
pub mod vision;

pub use config::ServerConfig;
pub use models::{
    Detection, DetectionOutput, ImageCaptioner, ModelConfig, ModelManager, ObjectDetector,
    SummaryParams, TextSummarizer,
};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Command-line overrides for [`ServerConfig`]

use clap::Parser;
use std::time::Duration;

use crate::config::ServerConfig;

/// Insight Node: object detection, captioning and summarization over HTTP
#[derive(Parser, Debug, Default)]
#[command(name = "insight-node")]
#[command(version)]
#[command(about = "Image analysis and document summarization service", long_about = None)]
pub struct Cli {
    /// Host to bind (default 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (default 5000)
    #[arg(long)]
    pub port: Option<u16>,

    /// Directory with the YOLOv8 ONNX export
    #[arg(long)]
    pub detection_model_dir: Option<String>,

    /// Directory with the BLIP ONNX export
    #[arg(long)]
    pub caption_model_dir: Option<String>,

    /// Directory with the BART ONNX export
    #[arg(long)]
    pub summarization_model_dir: Option<String>,

    /// Minimum detection confidence (default 0.25)
    #[arg(long)]
    pub conf_threshold: Option<f32>,

    /// NMS IoU threshold (default 0.7)
    #[arg(long)]
    pub iou_threshold: Option<f32>,

    /// URL fetch timeout in seconds (default 10)
    #[arg(long)]
    pub fetch_timeout_secs: Option<u64>,

    /// Maximum request body size in bytes (default 16 MiB)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    /// Serve deterministic stub models instead of loading ONNX exports
    #[arg(long)]
    pub stub_models: bool,
}

impl Cli {
    /// Apply the given flags on top of the defaults
    pub fn into_config(self) -> ServerConfig {
        let mut config = ServerConfig::default();

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(dir) = self.detection_model_dir {
            config.models.detection_model_dir = dir;
        }
        if let Some(dir) = self.caption_model_dir {
            config.models.caption_model_dir = dir;
        }
        if let Some(dir) = self.summarization_model_dir {
            config.models.summarization_model_dir = dir;
        }
        if let Some(conf) = self.conf_threshold {
            config.models.detection.conf_threshold = conf.clamp(0.0, 1.0);
        }
        if let Some(iou) = self.iou_threshold {
            config.models.detection.iou_threshold = iou.clamp(0.0, 1.0);
        }
        if let Some(secs) = self.fetch_timeout_secs {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(bytes) = self.max_upload_bytes {
            config.max_upload_bytes = bytes;
        }
        config.use_stub_models = self.stub_models;

        config
    }
}

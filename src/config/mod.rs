// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every setting has a fixed default; the command line is the only
//! override.

use std::net::SocketAddr;
use std::time::Duration;

use crate::content::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::models::{ModelConfig, SummaryParams};

/// Default request body cap for uploads
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Everything needed to start the HTTP service
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Model directories and detector settings
    pub models: ModelConfig,
    /// Timeout for `/summarize` URL fetches
    pub fetch_timeout: Duration,
    /// Summary length targets
    pub summary: SummaryParams,
    /// Largest accepted request body
    pub max_upload_bytes: usize,
    /// Serve deterministic stand-ins instead of loading ONNX models
    pub use_stub_models: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            models: ModelConfig::default(),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            summary: SummaryParams::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            use_stub_models: false,
        }
    }
}

impl ServerConfig {
    /// Socket address to bind
    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("Invalid listen address {}: {}", addr, e))
    }
}

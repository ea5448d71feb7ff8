// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image analysis endpoint (POST /analyze)
//!
//! Runs object detection and captioning on an uploaded image.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::analyze_handler;
pub use request::AnalyzeRequest;
pub use response::AnalyzeResponse;

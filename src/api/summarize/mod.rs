// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summarization endpoint (POST /summarize)
//!
//! Extracts text from an uploaded PDF/.docx or a fetched URL and returns
//! an abstractive summary.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::summarize_handler;
pub use request::{SummarizeRequest, SummarizeSource};
pub use response::SummarizeResponse;

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summarize response types

use serde::{Deserialize, Serialize};

/// Response from summarization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

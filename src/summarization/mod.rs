// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Abstractive text summarization for the `/summarize` endpoint

pub mod model;

pub use model::{truncate_input_ids, BartSummarizer, MAX_INPUT_TOKENS};

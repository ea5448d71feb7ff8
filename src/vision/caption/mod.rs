// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! BLIP image captioning

pub mod model;
pub mod preprocessing;

pub use model::{BlipCaptioner, DEFAULT_MAX_TOKENS};
pub use preprocessing::{preprocess_for_caption, CAPTION_INPUT_SIZE};

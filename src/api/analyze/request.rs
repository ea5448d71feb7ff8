// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Analyze request types

use crate::api::errors::ApiError;
use crate::api::form::{FormData, UploadedFile};

/// Multipart field carrying the image
pub const IMAGE_FIELD: &str = "image";

/// Validated `/analyze` input
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    pub image: UploadedFile,
}

impl AnalyzeRequest {
    /// Pull the image part out of the form
    pub fn from_form(mut form: FormData) -> Result<Self, ApiError> {
        let image = form
            .take_file(IMAGE_FIELD)
            .ok_or_else(|| ApiError::InvalidRequest("No image uploaded".to_string()))?;
        Ok(Self { image })
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Summarize request types

use crate::api::errors::ApiError;
use crate::api::form::{FormData, UploadedFile};
use crate::content::DocumentKind;

pub const FILE_FIELD: &str = "file";
pub const URL_FIELD: &str = "url";

/// Where the text to summarize comes from
#[derive(Debug, Clone)]
pub enum SummarizeSource {
    /// Uploaded document of a supported kind
    Document { kind: DocumentKind, file: UploadedFile },
    /// Page to fetch
    Url(String),
}

/// Validated `/summarize` input
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    pub source: SummarizeSource,
}

impl SummarizeRequest {
    /// Choose the source; a file part wins over a `url` field
    pub fn from_form(mut form: FormData) -> Result<Self, ApiError> {
        if let Some(file) = form.take_file(FILE_FIELD) {
            let kind = DocumentKind::from_filename(&file.filename)
                .ok_or_else(|| ApiError::InvalidRequest("Unsupported file type".to_string()))?;
            return Ok(Self {
                source: SummarizeSource::Document { kind, file },
            });
        }

        if let Some(url) = form.field(URL_FIELD) {
            return Ok(Self {
                source: SummarizeSource::Url(url.to_string()),
            });
        }

        Err(ApiError::InvalidRequest(
            "No file or URL provided".to_string(),
        ))
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Text extraction for summarization input
//!
//! Uploaded PDFs and Word documents are turned into newline-joined plain
//! text; URLs are fetched and their body used verbatim.

pub mod docx;
pub mod fetcher;
pub mod pdf;

use std::path::Path;
use thiserror::Error;

pub use fetcher::{FetchError, UrlFetcher, DEFAULT_FETCH_TIMEOUT_SECS};

/// Supported upload formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Match the filename's extension case-insensitively
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())?
            .to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// Failure to pull text out of an uploaded document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid PDF: {0}")]
    Pdf(String),

    #[error("invalid DOCX: {0}")]
    Docx(String),
}

/// Extract plain text from `bytes` of the given kind
pub fn extract_text(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractError> {
    match kind {
        DocumentKind::Pdf => pdf::extract_pdf_text(bytes),
        DocumentKind::Docx => docx::extract_docx_text(bytes),
    }
}

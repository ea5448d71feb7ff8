// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PDF text extraction

use lopdf::Document;
use tracing::{debug, warn};

use super::ExtractError;

/// Concatenate the text of every page, each followed by a newline
///
/// A page whose text cannot be decoded contributes an empty string.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages = doc.get_pages();
    debug!("PDF has {} pages", pages.len());

    let mut text = String::new();
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!("No text extracted from PDF page {}: {}", page_number, e),
        }
        text.push('\n');
    }

    Ok(text)
}

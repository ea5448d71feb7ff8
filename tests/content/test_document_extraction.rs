// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Document extraction tests through the public `extract_text` entry point
//!
//! These tests verify that:
//! - PDF pages come back in order
//! - Blank PDF pages yield whitespace only
//! - .docx paragraphs keep their order and character references are resolved
//! - A file of one kind is rejected by the other extractor

use insight_node::content::{extract_text, DocumentKind, ExtractError};

use crate::common::{docx_bytes, pdf_bytes};

#[test]
fn test_pdf_pages_in_order() {
    let pdf = pdf_bytes(&["Opening remarks", "", "Closing remarks"]);
    let text = extract_text(DocumentKind::Pdf, &pdf).unwrap();

    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Opening remarks"));
    assert!(lines[1].contains("Closing remarks"));
}

#[test]
fn test_blank_pdf_is_whitespace() {
    let pdf = pdf_bytes(&["", ""]);
    let text = extract_text(DocumentKind::Pdf, &pdf).unwrap();
    assert!(text.trim().is_empty());
}

#[test]
fn test_docx_paragraphs_and_references() {
    let docx = docx_bytes(&["Q3 &#8212; results", "Margins &amp; growth", "Outlook&#xA0;2025"]);
    let text = extract_text(DocumentKind::Docx, &docx).unwrap();
    assert_eq!(
        text,
        "Q3 \u{2014} results\nMargins & growth\nOutlook\u{a0}2025\n"
    );
}

#[test]
fn test_docx_bytes_are_not_a_pdf() {
    let docx = docx_bytes(&["hello"]);
    let err = extract_text(DocumentKind::Pdf, &docx).unwrap_err();
    assert!(matches!(err, ExtractError::Pdf(_)));
    assert!(err.to_string().starts_with("invalid PDF"));
}

#[test]
fn test_pdf_bytes_are_not_a_docx() {
    let pdf = pdf_bytes(&["hello"]);
    let err = extract_text(DocumentKind::Docx, &pdf).unwrap_err();
    assert!(matches!(err, ExtractError::Docx(_)));
}

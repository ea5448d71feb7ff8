// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Word (.docx) paragraph extraction
//!
//! Reads `word/document.xml` from the package and emits one line per
//! body paragraph. Table cells are skipped.

use regex::Regex;
use std::io::{Cursor, Read};
use std::sync::OnceLock;
use tracing::debug;
use zip::ZipArchive;

use super::ExtractError;

const DOCUMENT_PART: &str = "word/document.xml";

fn table_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<w:tbl>.*?</w:tbl>").expect("valid table regex"))
}

fn paragraph_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<w:p(?:\s[^>]*)?(?:/>|>(.*?)</w:p>)").expect("valid paragraph regex")
    })
}

fn run_content_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|<w:tab\s*/>|<w:(?:br|cr)(?:\s[^>]*)?/>")
            .expect("valid run regex")
    })
}

/// Text of every body paragraph, each followed by a newline
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(format!("not a zip archive: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::Docx(format!("missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::Docx(format!("failed to read {}: {}", DOCUMENT_PART, e)))?;

    let paragraphs = paragraphs_from_xml(&xml);
    debug!("DOCX has {} paragraphs", paragraphs.len());

    let mut text = String::new();
    for paragraph in paragraphs {
        text.push_str(&paragraph);
        text.push('\n');
    }
    Ok(text)
}

/// Paragraph texts of a `document.xml` body, in order
pub fn paragraphs_from_xml(xml: &str) -> Vec<String> {
    let body = table_regex().replace_all(xml, "");

    paragraph_regex()
        .captures_iter(&body)
        .map(|caps| {
            caps.get(1)
                .map(|inner| paragraph_text(inner.as_str()))
                .unwrap_or_default()
        })
        .collect()
}

fn paragraph_text(inner: &str) -> String {
    let mut text = String::new();
    for caps in run_content_regex().captures_iter(inner) {
        match caps.get(1) {
            Some(t) => text.push_str(&decode_xml_entities(t.as_str())),
            None => {
                if caps[0].starts_with("<w:tab") {
                    text.push('\t');
                } else {
                    text.push('\n');
                }
            }
        }
    }
    text
}

fn entity_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"&(?:#[xX]([0-9a-fA-F]+)|#([0-9]+)|(lt|gt|quot|apos|amp));")
            .expect("valid entity regex")
    })
}

/// Resolve predefined entities and numeric character references in one pass
///
/// References to invalid code points are left as written.
fn decode_xml_entities(text: &str) -> String {
    entity_regex()
        .replace_all(text, |caps: &regex::Captures| {
            let code_point = if let Some(hex) = caps.get(1) {
                u32::from_str_radix(hex.as_str(), 16).ok()
            } else if let Some(dec) = caps.get(2) {
                dec.as_str().parse::<u32>().ok()
            } else {
                return match &caps[3] {
                    "lt" => "<",
                    "gt" => ">",
                    "quot" => "\"",
                    "apos" => "'",
                    _ => "&",
                }
                .to_string();
            };

            code_point
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Form extraction shared by both endpoints
//!
//! Accepts `multipart/form-data` (files and text fields) and
//! `application/x-www-form-urlencoded` (text fields only). Any other body
//! yields an empty form so handlers can report the missing field.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::rejection::FormRejection;
use axum::extract::{FromRequest, Request};
use axum::http::{header, StatusCode};
use axum::Form;
use axum_extra::extract::multipart::MultipartError;
use axum_extra::extract::Multipart;
use std::collections::HashMap;
use tracing::debug;

use super::errors::ApiError;

/// One uploaded file part
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename (may be empty)
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Parsed form body
#[derive(Debug, Clone, Default)]
pub struct FormData {
    files: HashMap<String, UploadedFile>,
    fields: HashMap<String, String>,
}

impl FormData {
    /// Build from text fields only
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        Self {
            files: HashMap::new(),
            fields,
        }
    }

    pub fn insert_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.insert(name.into(), file);
    }

    /// Remove and return the file part called `name`
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Read every part of a multipart body
    ///
    /// A part with a filename is a file; anything else is a text field.
    /// When a name repeats, the first part wins.
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let bytes = field.bytes().await.map_err(multipart_error)?;
                    debug!("Form file '{}': {} ({} bytes)", name, filename, bytes.len());
                    form.files.entry(name).or_insert(UploadedFile {
                        filename,
                        content_type,
                        bytes,
                    });
                }
                None => {
                    let value = field.text().await.map_err(multipart_error)?;
                    form.fields.entry(name).or_insert(value);
                }
            }
        }

        Ok(form)
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("Upload too large: {}", e))
    } else {
        ApiError::InvalidRequest(format!("Invalid multipart form: {}", e))
    }
}

fn form_error(e: FormRejection) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("Upload too large: {}", e))
    } else {
        ApiError::InvalidRequest(format!("Invalid form: {}", e))
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormData
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidRequest(format!("Invalid multipart form: {}", e)))?;
            Self::from_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(form_error)?;
            Ok(Self::from_fields(fields))
        } else {
            Ok(Self::default())
        }
    }
}

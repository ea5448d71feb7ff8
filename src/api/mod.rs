// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP API: `/analyze` and `/summarize`

pub mod analyze;
pub mod errors;
pub mod form;
pub mod http_server;
pub mod summarize;

pub use analyze::{analyze_handler, AnalyzeRequest, AnalyzeResponse};
pub use errors::{ApiError, ErrorResponse};
pub use form::{FormData, UploadedFile};
pub use http_server::{create_app, start_server, AppState};
pub use summarize::{summarize_handler, SummarizeRequest, SummarizeResponse, SummarizeSource};

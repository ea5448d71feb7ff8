// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Router construction and server startup

use axum::{
    extract::DefaultBodyLimit,
    http::StatusCode,
    routing::post,
    Router,
};
use std::time::Duration;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::analyze::analyze_handler;
use super::summarize::summarize_handler;
use crate::config::{ServerConfig, DEFAULT_MAX_UPLOAD_BYTES};
use crate::content::{FetchError, UrlFetcher, DEFAULT_FETCH_TIMEOUT_SECS};
use crate::models::{ModelManager, SummaryParams};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Loaded models, read-only after startup
    pub models: ModelManager,
    pub fetcher: UrlFetcher,
    pub summary_params: SummaryParams,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(models: ModelManager, config: &ServerConfig) -> Result<Self, FetchError> {
        Ok(Self {
            models,
            fetcher: UrlFetcher::new(config.fetch_timeout)?,
            summary_params: config.summary,
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    /// State backed by the stub models and default settings
    pub fn new_for_test() -> Self {
        Self::with_models_for_test(ModelManager::stub())
    }

    pub fn with_models_for_test(models: ModelManager) -> Self {
        Self {
            models,
            fetcher: UrlFetcher::new(Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS))
                .expect("Failed to create HTTP client"),
            summary_params: SummaryParams::default(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("models", &self.models)
            .field("summary_params", &self.summary_params)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish_non_exhaustive()
    }
}

/// Empty acknowledgement for OPTIONS requests that are not CORS preflights
async fn options_handler() -> StatusCode {
    StatusCode::OK
}

/// Build the application router
pub fn create_app(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    Router::new()
        .route("/analyze", post(analyze_handler).options(options_handler))
        .route("/summarize", post(summarize_handler).options(options_handler))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn start_server(config: &ServerConfig, models: ModelManager) -> anyhow::Result<()> {
    let state = AppState::new(models, config)?;
    let app = create_app(state);

    let addr = config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

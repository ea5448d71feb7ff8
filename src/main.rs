// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use insight_node::{api::start_server, cli::Cli, models::ModelManager, version};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = Cli::parse().into_config();

    info!("🚀 Starting {}", version::get_version_string());
    info!("Build: {}", version::get_version_info());

    let models = if config.use_stub_models {
        warn!("Serving stub models, outputs are not real inferences");
        ModelManager::stub()
    } else {
        info!("🧠 Loading models...");
        ModelManager::load(&config.models).await?
    };
    info!("✅ Models ready: {}", models.model_names().join(", "));

    start_server(&config, models).await
}

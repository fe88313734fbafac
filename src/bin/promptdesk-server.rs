// ABOUTME: Server binary: loads configuration, opens the store and serves the HTTP API
// ABOUTME: Exits non-zero when configuration, storage or the model client cannot be set up
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Promptdesk Server Binary
//!
//! Starts the template-driven chat API on the configured port.

use anyhow::Result;
use clap::Parser;
use promptdesk_server::{
    config::environment::ServerConfig,
    database_plugins::factory::open_database,
    llm::{LlmProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider},
    logging,
    resources::ServerResources,
    server,
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "promptdesk-server")]
#[command(about = "Promptdesk - template-driven chat API")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Promptdesk server");
    info!("{}", config.summary());

    let database = open_database(&config.database_url).await?;
    info!("Database ready");

    let llm = Arc::new(OpenAiCompatibleProvider::new(OpenAiCompatibleConfig::from(
        &config.llm,
    ))?);
    match llm.health_check().await {
        Ok(true) => info!(model = llm.default_model(), "Language model endpoint reachable"),
        Ok(false) => warn!(base_url = %config.llm.base_url, "Language model endpoint answered with an error"),
        Err(e) => warn!(error = %e, "Language model endpoint unreachable; sends will fail until it recovers"),
    }

    let resources = Arc::new(ServerResources::new(Arc::new(config), database, llm));

    if let Err(e) = server::run(resources).await {
        error!("Server error: {e}");
        return Err(e.into());
    }

    Ok(())
}

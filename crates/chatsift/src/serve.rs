// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `chatsift serve` command implementation.
//!
//! Wires the configured store backend, the optional Anthropic annotator, and
//! the pipeline into the HTTP gateway, then serves until a shutdown signal
//! arrives.

use std::sync::Arc;
use std::time::Duration;

use chatsift_anthropic::ClaudeAnnotator;
use chatsift_config::ChatsiftConfig;
use chatsift_core::{Annotator, ChatsiftError};
use chatsift_gateway::{AppState, AuthConfig, start_server};
use chatsift_pipeline::Pipeline;
use tracing::{info, warn};

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies to
/// chatsift crates with quieter defaults for dependencies.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{log_level},tower_http=warn")));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Build the pipeline from configuration: store backend, optional remote
/// annotator, timeouts.
pub async fn build_pipeline(config: &ChatsiftConfig) -> Result<Arc<Pipeline>, ChatsiftError> {
    let store = chatsift_storage::open_store(&config.storage).await?;

    let annotator: Option<Arc<dyn Annotator>> = match ClaudeAnnotator::from_config(&config.anthropic)? {
        Some(annotator) => Some(Arc::new(annotator)),
        None => {
            info!("no Anthropic credentials configured, using local keyword classification");
            None
        }
    };

    Ok(Arc::new(Pipeline::new(
        store,
        annotator,
        &config.pipeline,
        Duration::from_secs(config.anthropic.timeout_secs),
    )))
}

/// Runs the `chatsift serve` command.
pub async fn run_serve(config: ChatsiftConfig) -> Result<(), ChatsiftError> {
    info!(service = config.service.name, "starting chatsift serve");

    let pipeline = build_pipeline(&config).await?;
    let store = Arc::clone(pipeline.store());

    if !config.gateway.enabled {
        warn!("gateway is disabled in configuration, nothing to serve");
        return Ok(());
    }

    if config.gateway.bearer_token.is_none() {
        warn!("gateway has no bearer token configured, /v1 routes are open");
    }

    let state = AppState::new(
        pipeline,
        AuthConfig {
            bearer_token: config.gateway.bearer_token.clone(),
        },
    );

    start_server(&config.gateway, state, shutdown_signal()).await?;

    store.close().await?;
    info!("chatsift stopped");
    Ok(())
}

/// Resolves when a shutdown signal (ctrl-c) arrives.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for shutdown signal");
        // Fall through: serve until the process is killed externally.
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

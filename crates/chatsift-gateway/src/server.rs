// SPDX-FileCopyrightText: 2026 Chatsift Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state. The several near-duplicate
//! servers of the prototype this replaces collapse into this one router over
//! the single store abstraction.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use chatsift_config::model::GatewayConfig;
use chatsift_core::{ChatsiftError, MessageStore};
use chatsift_pipeline::Pipeline;
use tower_http::cors::CorsLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Ingest path: raw message -> processed record.
    pub pipeline: Arc<Pipeline>,
    /// Read path: listings, groups, stats.
    pub store: Arc<dyn MessageStore>,
    /// Authentication configuration for `/v1/*` routes.
    pub auth: AuthConfig,
    /// Process start time for uptime reporting.
    pub start_time: Instant,
}

impl AppState {
    /// Builds state around a pipeline, reading through its store handle.
    pub fn new(pipeline: Arc<Pipeline>, auth: AuthConfig) -> Self {
        let store = Arc::clone(pipeline.store());
        Self {
            pipeline,
            store,
            auth,
            start_time: Instant::now(),
        }
    }
}

/// Assemble the gateway router.
///
/// - `GET /health` is public.
/// - Everything under `/v1/` passes the bearer-auth middleware.
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let api_routes = Router::new()
        .route(
            "/v1/messages",
            post(handlers::post_message).get(handlers::list_messages),
        )
        .route("/v1/stats", get(handlers::get_overview))
        .route("/v1/groups", get(handlers::list_groups))
        .route("/v1/groups/{group_id}", get(handlers::get_group))
        .route(
            "/v1/groups/{group_id}/messages",
            post(handlers::post_group_messages).get(handlers::list_group_messages),
        )
        .route(
            "/v1/groups/{group_id}/stats",
            get(handlers::get_group_stats),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(CorsLayer::permissive())
}

/// Start the gateway HTTP server and serve until `shutdown` resolves.
pub async fn start_server(
    config: &GatewayConfig,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ChatsiftError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener =
        tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ChatsiftError::Channel {
                message: format!("failed to bind gateway to {addr}: {e}"),
                source: Some(Box::new(e)),
            })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ChatsiftError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}

// SPDX-FileCopyrightText: 2026 Handoff Contributors
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router assembly and server lifecycle.
//!
//! Three route groups share one [`GatewayState`]:
//!
//! - `/health`: unauthenticated liveness probe
//! - `/widget/v1/*`: the open visitor surface
//! - `/operator/v1/*`: bearer-authorized support surface
//!
//! CORS is permissive because the widget is embedded on arbitrary
//! customer pages; the operator surface relies on the bearer token, not
//! the origin.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};
use handoff_core::{Authorizer, HandoffError};
use handoff_engine::HandoffEngine;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth;
use crate::handlers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct GatewayState {
    /// The escalation and ledger engine.
    pub engine: HandoffEngine,
    /// Decides operator-surface access.
    pub authorizer: Arc<dyn Authorizer>,
    /// Process start, for the health endpoint's uptime.
    pub started_at: Instant,
}

impl GatewayState {
    pub fn new(engine: HandoffEngine, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            engine,
            authorizer,
            started_at: Instant::now(),
        }
    }
}

/// Gateway bind configuration (mirrors the bind half of `GatewayConfig`
/// from handoff-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

/// Builds the full route tree. Factored out of [`start_server`] so tests
/// can drive the router without binding a socket.
pub fn router(state: GatewayState) -> Router {
    let widget = Router::new()
        .route("/widget/v1/conversations", post(handlers::post_conversations))
        .route(
            "/widget/v1/conversations/{id}/messages",
            post(handlers::post_messages),
        )
        .route("/widget/v1/conversations/{id}/poll", get(handlers::get_poll))
        .route(
            "/widget/v1/conversations/{id}/escalate",
            post(handlers::post_escalate),
        )
        .route("/widget/v1/conversations/{id}/end", post(handlers::post_end));

    let operator = Router::new()
        .route("/operator/v1/escalations", get(handlers::get_escalations))
        .route(
            "/operator/v1/conversations/{id}/reply",
            post(handlers::post_reply),
        )
        .route(
            "/operator/v1/conversations/{id}/status",
            put(handlers::put_status),
        )
        .route_layer(middleware::from_fn_with_state(
            state.authorizer.clone(),
            auth::operator_auth,
        ));

    Router::new()
        .route("/health", get(handlers::get_health))
        .merge(widget)
        .merge(operator)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds the gateway and serves until `shutdown` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), HandoffError> {
    let app = router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        HandoffError::Internal(format!("failed to bind gateway to {addr}: {e}"))
    })?;

    info!("gateway listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| HandoffError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}

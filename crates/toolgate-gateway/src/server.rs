// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self as axum_middleware, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio_util::sync::CancellationToken;
use toolgate_core::ToolgateError;
use toolgate_tools::ToolRegistry;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::chat::ChatProxy;
use crate::handlers;
use crate::Limits;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The tool registry, read-only once serving starts.
    pub registry: Arc<ToolRegistry>,
    pub limits: Limits,
    /// Upstream chat proxy, if one is configured.
    pub chat: Option<Arc<ChatProxy>>,
}

/// Address the gateway binds to.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the gateway router with all routes and middleware.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz))
        .route("/tools", get(handlers::list_tools))
        .route(
            "/call-tool",
            post(handlers::call_tool).options(handlers::call_tool_preflight),
        )
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .route("/v1/models", get(handlers::list_models))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(axum_middleware::from_fn(preflight_no_content))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// Answers CORS preflight requests with `204 No Content`.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let is_options = req.method() == Method::OPTIONS;
    let mut response = next.run(req).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Start the gateway HTTP server.
///
/// Serves until `shutdown` is cancelled, then stops accepting connections and
/// lets in-flight requests finish.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), ToolgateError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ToolgateError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| ToolgateError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

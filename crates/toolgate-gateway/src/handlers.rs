// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_tools::ToolDefinition;
use tracing::{debug, info};

use crate::body::read_json;
use crate::error::ApiError;
use crate::server::GatewayState;

/// Request body for POST /call-tool.
#[derive(Debug, Deserialize)]
pub struct CallRequest {
    pub name: String,
    #[serde(default)]
    pub args: Value,
}

/// Response body for POST /call-tool.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub result: Value,
    pub elapsed_ms: u64,
}

/// Response body for GET /healthz.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /healthz
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// GET /tools
pub async fn list_tools(State(state): State<GatewayState>) -> Json<Vec<ToolDefinition>> {
    Json(state.registry.list_tools())
}

/// POST /call-tool
pub async fn call_tool(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<CallResponse>, ApiError> {
    let request: CallRequest = read_json(&headers, body, &state.limits).await?;
    let request_id = uuid::Uuid::new_v4();
    debug!(%request_id, tool = %request.name, "tool call received");

    let started = Instant::now();
    let result = state
        .registry
        .invoke_with_deadline(&request.name, &request.args, state.limits.tool_timeout)
        .await?;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    info!(%request_id, tool = %request.name, elapsed_ms, "tool call completed");
    Ok(Json(CallResponse { result, elapsed_ms }))
}

/// OPTIONS /call-tool
pub async fn call_tool_preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// POST /v1/chat/completions
pub async fn chat_completions(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Body,
) -> Result<Json<Value>, ApiError> {
    let proxy = state
        .chat
        .as_ref()
        .ok_or_else(ApiError::upstream_not_configured)?;
    let request: Value = read_json(&headers, body, &state.limits).await?;
    let response = proxy
        .complete(&state.registry, request, state.limits.tool_timeout)
        .await?;
    Ok(Json(response))
}

/// GET /v1/models
pub async fn list_models(State(state): State<GatewayState>) -> Result<Json<Value>, ApiError> {
    let proxy = state
        .chat
        .as_ref()
        .ok_or_else(ApiError::upstream_not_configured)?;
    Ok(Json(proxy.models().await?))
}

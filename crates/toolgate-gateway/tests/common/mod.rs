// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for gateway integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Response;
use serde_json::{json, Value};
use toolgate_core::{
    ParamSpec, ParamType, Plugin, PluginContext, PluginHandle, ToolArgs, ToolDescriptor,
    ToolFunction, ToolgateError,
};
use toolgate_gateway::{ChatProxy, GatewayState, Limits};
use toolgate_tools::ToolRegistry;

pub struct MathPlugin;

#[async_trait]
impl Plugin for MathPlugin {
    async fn init(&self, _ctx: &PluginContext) -> Result<(), ToolgateError> {
        Ok(())
    }

    fn tools(self: Arc<Self>) -> Vec<ToolFunction> {
        vec![
            ToolFunction::new(
                ToolDescriptor::new("sum", "Add two integers").schema(json!({
                    "type": "object",
                    "properties": {
                        "a": { "type": "integer" },
                        "b": { "type": "integer" }
                    },
                    "required": ["a", "b"]
                })),
                vec![
                    ParamSpec::new("a", ParamType::Integer),
                    ParamSpec::new("b", ParamType::Integer),
                ],
                |args: ToolArgs| async move {
                    let a: i64 = args.get("a")?;
                    let b: i64 = args.get("b")?;
                    Ok(json!(a + b))
                },
            ),
            ToolFunction::new(
                ToolDescriptor::new("sleep", "Sleep for a long time"),
                vec![],
                |_args: ToolArgs| async move {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Value::Null)
                },
            ),
            ToolFunction::new(
                ToolDescriptor::new("explode", "Always fails"),
                vec![],
                |_args: ToolArgs| async move {
                    Err(ToolgateError::plugin("math", "exploded on purpose"))
                },
            ),
        ]
    }

    async fn shutdown(&self) -> Result<(), ToolgateError> {
        Ok(())
    }
}

pub async fn math_handle() -> Arc<PluginHandle> {
    let handle = Arc::new(PluginHandle::new("math", Arc::new(MathPlugin)));
    let ctx = PluginContext {
        host_version: semver::Version::new(1, 0, 0),
        api_version: semver::Version::new(1, 0, 0),
        config: json!({}),
        data_dir: None,
    };
    handle.init(&ctx).await.unwrap();
    handle
}

pub fn limits() -> Limits {
    Limits {
        max_body_bytes: 1024,
        body_read_timeout: Duration::from_millis(200),
        tool_timeout: Duration::from_millis(200),
    }
}

pub async fn state_with(handle: &Arc<PluginHandle>, chat: Option<ChatProxy>) -> GatewayState {
    let mut registry = ToolRegistry::new();
    registry.register_plugin(handle);
    GatewayState {
        registry: Arc::new(registry),
        limits: limits(),
        chat: chat.map(Arc::new),
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Discovery and invocation through a plugin with three declared tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use toolgate_core::{
    ParamSpec, ParamType, Plugin, PluginContext, PluginHandle, ToolArgs, ToolDescriptor,
    ToolFunction, ToolgateError,
};
use toolgate_tools::ToolRegistry;

#[derive(Debug, Deserialize)]
struct Address {
    city: String,
    zip: String,
}

struct SamplePlugin;

#[async_trait]
impl Plugin for SamplePlugin {
    async fn init(&self, _ctx: &PluginContext) -> Result<(), ToolgateError> {
        Ok(())
    }

    fn tools(self: Arc<Self>) -> Vec<ToolFunction> {
        vec![
            ToolFunction::new(
                ToolDescriptor::new("sum", "Add two integers")
                    .schema(json!({
                        "type": "object",
                        "properties": {
                            "a": { "type": "integer" },
                            "b": { "type": "integer" }
                        },
                        "required": ["a", "b"]
                    }))
                    .doc("a", "First addend")
                    .doc("b", "Second addend"),
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
                ToolDescriptor::new("greet", "Greet someone").schema(json!({
                    "type": "object",
                    "properties": { "name": { "type": "string" } }
                })),
                vec![ParamSpec::with_default("name", ParamType::String, "world")],
                |args: ToolArgs| async move {
                    let name: String = args.get("name")?;
                    Ok(json!(format!("Hello, {name}")))
                },
            ),
            ToolFunction::new(
                ToolDescriptor::new("label", "Format a mailing label").schema(json!({
                    "type": "object",
                    "properties": {
                        "address": { "type": "object" },
                        "uppercase": { "type": "boolean" }
                    },
                    "required": ["address"]
                })),
                vec![
                    ParamSpec::new("address", ParamType::Object),
                    ParamSpec::with_default("uppercase", ParamType::Boolean, false),
                ],
                |args: ToolArgs| async move {
                    let address: Address = args.get("address")?;
                    let upper: bool = args.get("uppercase")?;
                    let label = format!("{} {}", address.zip, address.city);
                    Ok(json!(if upper { label.to_uppercase() } else { label }))
                },
            ),
        ]
    }

    async fn shutdown(&self) -> Result<(), ToolgateError> {
        Ok(())
    }
}

async fn registry() -> ToolRegistry {
    let handle = Arc::new(PluginHandle::new("sample", Arc::new(SamplePlugin)));
    let ctx = PluginContext {
        host_version: semver::Version::new(1, 0, 0),
        api_version: semver::Version::new(1, 0, 0),
        config: json!({}),
        data_dir: None,
    };
    handle.init(&ctx).await.unwrap();

    let mut registry = ToolRegistry::new();
    assert_eq!(registry.register_plugin(&handle), 3);
    registry
}

#[tokio::test]
async fn discovery_lists_declared_tools_with_metadata() {
    let registry = registry().await;
    let tools = registry.list_tools();

    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["greet", "label", "sum"]);
    assert!(tools.iter().all(|t| t.plugin_id == "sample"));

    let counts: Vec<usize> = tools.iter().map(|t| t.parameters.len()).collect();
    assert_eq!(counts, vec![1, 2, 2]);

    let sum = registry.get("sum").unwrap();
    assert!(sum.parameters.iter().all(|p| p.required));
    assert_eq!(sum.parameters[0].description, "First addend");
}

#[tokio::test]
async fn sum_happy_path() {
    let registry = registry().await;
    let out = registry.invoke("sum", &json!({"a": 2, "b": 3})).await.unwrap();
    assert_eq!(out, json!(5));
}

#[tokio::test]
async fn structured_argument_binds_known_fields_and_ignores_extras() {
    let registry = registry().await;
    let out = registry
        .invoke(
            "label",
            &json!({"address": {"city": "Lyon", "zip": "69001", "country": "FR"}, "uppercase": "true"}),
        )
        .await
        .unwrap();
    assert_eq!(out, json!("69001 LYON"));
}

#[tokio::test]
async fn default_value_applies_when_omitted() {
    let registry = registry().await;
    let out = registry.invoke("greet", &json!({})).await.unwrap();
    assert_eq!(out, json!("Hello, world"));
    let out = registry.invoke("greet", &Value::Null).await.unwrap();
    assert_eq!(out, json!("Hello, world"));
}

#[tokio::test]
async fn missing_required_argument_is_reported() {
    let registry = registry().await;
    let err = registry.invoke("sum", &json!({"a": 2})).await.unwrap_err();
    assert!(matches!(err, ToolgateError::InvalidArgument(_)));
    assert!(err.to_string().contains("Missing required parameter"));
}

#[tokio::test]
async fn listing_is_byte_identical_across_calls() {
    let registry = registry().await;
    let first = serde_json::to_string(&registry.list_tools()).unwrap();
    let second = serde_json::to_string(&registry.list_tools()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("\"pluginId\":\"sample\""));
    assert!(first.contains("\"jsonType\":\"integer\""));
}

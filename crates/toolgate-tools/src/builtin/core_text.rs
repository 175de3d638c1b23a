// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text and JSON utilities.
//!
//! Configuration (`plugins.config.core-text`):
//!
//! - `ellipsis` (string, default `"..."`): appended by `truncate` when text is cut.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use toolgate_core::{
    ParamSpec, ParamType, Plugin, PluginContext, ToolArgs, ToolDescriptor, ToolFunction,
    ToolgateError,
};
use tracing::{debug, warn};

const DEFAULT_ELLIPSIS: &str = "...";
const DEFAULT_MAX_CHARS: i64 = 80;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CoreTextConfig {
    ellipsis: String,
}

impl Default for CoreTextConfig {
    fn default() -> Self {
        Self {
            ellipsis: DEFAULT_ELLIPSIS.to_string(),
        }
    }
}

/// Built-in plugin exposing string and JSON helpers.
#[derive(Debug, Default)]
pub struct CoreTextPlugin {
    config: OnceLock<CoreTextConfig>,
}

impl CoreTextPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn ellipsis(&self) -> &str {
        self.config
            .get()
            .map(|c| c.ellipsis.as_str())
            .unwrap_or(DEFAULT_ELLIPSIS)
    }
}

#[async_trait]
impl Plugin for CoreTextPlugin {
    async fn init(&self, ctx: &PluginContext) -> Result<(), ToolgateError> {
        let config: CoreTextConfig = serde_json::from_value(ctx.config.clone())
            .map_err(|e| ToolgateError::plugin("core-text", format!("invalid config: {e}")))?;
        debug!(ellipsis = %config.ellipsis, "core-text configured");
        if self.config.set(config).is_err() {
            warn!("core-text already configured, keeping the first configuration");
        }
        Ok(())
    }

    fn tools(self: Arc<Self>) -> Vec<ToolFunction> {
        let truncate_owner = Arc::clone(&self);
        vec![
            ToolFunction::new(
                ToolDescriptor::new("normalize_whitespace", "Collapse runs of whitespace")
                    .long_description("Trims the text and replaces every run of whitespace with a single space.")
                    .schema(json!({
                        "type": "object",
                        "properties": { "text": { "type": "string" } },
                        "required": ["text"]
                    }))
                    .doc("text", "Text to normalise"),
                vec![ParamSpec::new("text", ParamType::String)],
                |args: ToolArgs| async move {
                    let text: String = args.get("text")?;
                    Ok(Value::String(normalize_whitespace(&text)))
                },
            ),
            ToolFunction::new(
                ToolDescriptor::new("truncate", "Shorten text to a maximum length")
                    .schema(json!({
                        "type": "object",
                        "properties": {
                            "text": { "type": "string" },
                            "max_chars": { "type": "integer", "minimum": 0 }
                        },
                        "required": ["text"]
                    }))
                    .doc("text", "Text to shorten")
                    .doc("max_chars", "Maximum number of characters kept, ellipsis included"),
                vec![
                    ParamSpec::new("text", ParamType::String),
                    ParamSpec::with_default("max_chars", ParamType::Integer, DEFAULT_MAX_CHARS),
                ],
                move |args: ToolArgs| {
                    let plugin = Arc::clone(&truncate_owner);
                    async move {
                        let text: String = args.get("text")?;
                        let max_chars: usize = args.get("max_chars")?;
                        Ok(Value::String(truncate(&text, max_chars, plugin.ellipsis())))
                    }
                },
            ),
            ToolFunction::new(
                ToolDescriptor::new("word_count", "Count whitespace-separated words")
                    .schema(json!({
                        "type": "object",
                        "properties": { "text": { "type": "string" } },
                        "required": ["text"]
                    })),
                vec![ParamSpec::new("text", ParamType::String)],
                |args: ToolArgs| async move {
                    let text: String = args.get("text")?;
                    Ok(json!(text.split_whitespace().count()))
                },
            ),
            ToolFunction::new(
                ToolDescriptor::new("json_pointer", "Extract a value from a JSON document")
                    .long_description("Resolves an RFC 6901 pointer such as `/items/0/name`.")
                    .schema(json!({
                        "type": "object",
                        "properties": {
                            "document": {},
                            "pointer": { "type": "string" }
                        },
                        "required": ["document", "pointer"]
                    }))
                    .doc("document", "Any JSON value")
                    .doc("pointer", "JSON pointer, empty for the whole document"),
                vec![
                    ParamSpec::new("document", ParamType::Any),
                    ParamSpec::new("pointer", ParamType::String),
                ],
                |args: ToolArgs| async move {
                    let document: Value = args.get("document")?;
                    let pointer: String = args.get("pointer")?;
                    document.pointer(&pointer).cloned().ok_or_else(|| {
                        ToolgateError::InvalidArgument(format!(
                            "pointer `{pointer}` does not resolve"
                        ))
                    })
                },
            ),
        ]
    }

    async fn shutdown(&self) -> Result<(), ToolgateError> {
        Ok(())
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(text: &str, max_chars: usize, ellipsis: &str) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let ellipsis_len = ellipsis.chars().count();
    if max_chars <= ellipsis_len {
        return text.chars().take(max_chars).collect();
    }
    let mut out: String = text.chars().take(max_chars - ellipsis_len).collect();
    out.push_str(ellipsis);
    out
}

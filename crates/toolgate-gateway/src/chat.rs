// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI-compatible chat-completion proxy.
//!
//! Requests are forwarded to the upstream provider with the registry's tool
//! catalogue injected. When the model answers with tool calls, they are run
//! against the registry, their results appended as `tool` messages, and the
//! conversation re-sent, up to a fixed number of rounds. The final upstream
//! response is returned verbatim.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{json, Value};
use toolgate_core::ToolgateError;
use toolgate_tools::ToolRegistry;
use tracing::{debug, info, warn};

/// Upstream provider settings.
#[derive(Clone)]
pub struct ChatConfig {
    /// Base URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Maximum number of tool-execution rounds per request.
    pub max_tool_rounds: usize,
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .field("timeout", &self.timeout)
            .field("max_tool_rounds", &self.max_tool_rounds)
            .finish()
    }
}

/// Client for the upstream chat-completion API.
#[derive(Debug)]
pub struct ChatProxy {
    client: reqwest::Client,
    base_url: String,
    max_tool_rounds: usize,
}

impl ChatProxy {
    pub fn new(config: ChatConfig) -> Result<Self, ToolgateError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {key}")).map_err(|e| {
                ToolgateError::Config(format!("invalid upstream API key header value: {e}"))
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ToolgateError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_tool_rounds: config.max_tool_rounds,
        })
    }

    /// Runs a chat completion, executing tool calls until the model stops
    /// requesting them or the round limit is reached.
    pub async fn complete(
        &self,
        registry: &ToolRegistry,
        request: Value,
        tool_timeout: Duration,
    ) -> Result<Value, ToolgateError> {
        let Value::Object(mut request) = request else {
            return Err(ToolgateError::InvalidArgument(
                "chat request must be a JSON object".to_string(),
            ));
        };

        if request.get("stream").and_then(Value::as_bool) == Some(true) {
            return Err(ToolgateError::InvalidArgument(
                "streaming chat completions are not supported".to_string(),
            ));
        }

        if !request.contains_key("tools") && !registry.is_empty() {
            request.insert("tools".to_string(), Value::Array(registry.openai_tools()));
        }

        let mut rounds = 0;
        loop {
            let response = self.post_completion(&Value::Object(request.clone())).await?;

            let message = &response["choices"][0]["message"];
            let calls = match message.get("tool_calls").and_then(Value::as_array) {
                Some(calls) if !calls.is_empty() => calls.clone(),
                _ => return Ok(response),
            };
            if rounds >= self.max_tool_rounds {
                warn!(rounds, "tool round limit reached, returning last upstream response");
                return Ok(response);
            }
            rounds += 1;

            let messages = request
                .entry("messages")
                .or_insert_with(|| Value::Array(Vec::new()));
            let Value::Array(messages) = messages else {
                return Err(ToolgateError::InvalidArgument(
                    "`messages` must be an array".to_string(),
                ));
            };

            messages.push(message.clone());
            for call in &calls {
                messages.push(execute_call(registry, call, tool_timeout).await);
            }
            info!(round = rounds, calls = calls.len(), "executed upstream tool calls");
        }
    }

    /// Fetches the upstream model list.
    pub async fn models(&self) -> Result<Value, ToolgateError> {
        let url = format!("{}/models", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport_error)?;
        read_response(response).await
    }

    async fn post_completion(&self, request: &Value) -> Result<Value, ToolgateError> {
        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        read_response(response).await
    }
}

fn transport_error(e: reqwest::Error) -> ToolgateError {
    ToolgateError::Upstream {
        message: format!("request to upstream failed: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn read_response(response: reqwest::Response) -> Result<Value, ToolgateError> {
    let status = response.status();
    debug!(status = %status, "upstream response received");

    let body = response.text().await.map_err(|e| ToolgateError::Upstream {
        message: format!("failed to read upstream response: {e}"),
        source: Some(Box::new(e)),
    })?;

    if !status.is_success() {
        return Err(ToolgateError::Upstream {
            message: format!("upstream returned {status}: {body}"),
            source: None,
        });
    }

    serde_json::from_str(&body).map_err(|e| ToolgateError::Upstream {
        message: format!("failed to parse upstream response: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Runs one OpenAI tool call and renders the `tool` message answering it.
///
/// Failures become `{"error": ...}` content so the model can recover.
async fn execute_call(registry: &ToolRegistry, call: &Value, tool_timeout: Duration) -> Value {
    let id = call.get("id").and_then(Value::as_str).unwrap_or_default();
    let name = call["function"]["name"].as_str().unwrap_or_default();

    let outcome = match parse_arguments(&call["function"]["arguments"]) {
        Ok(args) => registry.invoke_with_deadline(name, &args, tool_timeout).await,
        Err(e) => Err(e),
    };

    let content = match outcome {
        Ok(Value::String(text)) => text,
        Ok(value) => value.to_string(),
        Err(e) => {
            warn!(tool = %name, error = %e, "tool call from model failed");
            json!({ "error": e.to_string() }).to_string()
        }
    };

    json!({
        "role": "tool",
        "tool_call_id": id,
        "content": content,
    })
}

/// OpenAI sends arguments as a JSON-encoded string; some providers send an object.
fn parse_arguments(raw: &Value) -> Result<Value, ToolgateError> {
    match raw {
        Value::String(s) if s.trim().is_empty() => Ok(json!({})),
        Value::String(s) => serde_json::from_str(s).map_err(|e| {
            ToolgateError::InvalidArgument(format!("tool call arguments are not valid JSON: {e}"))
        }),
        Value::Null => Ok(json!({})),
        other => Ok(other.clone()),
    }
}

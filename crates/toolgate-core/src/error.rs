// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Toolgate plugin host.

use std::time::Duration;

use thiserror::Error;

/// The primary error type used across plugins, the tool registry and the gateway.
#[derive(Debug, Error)]
pub enum ToolgateError {
    /// Configuration errors (invalid TOML, bad values, unreadable files).
    #[error("configuration error: {0}")]
    Config(String),

    /// A plugin manifest is missing, unreadable or structurally invalid.
    #[error("invalid plugin manifest: {0}")]
    Manifest(String),

    /// No tool with the requested name is registered.
    #[error("tool not found: {name}")]
    ToolNotFound { name: String },

    /// A tool argument is missing, has the wrong type, or fails schema validation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request body exceeded the configured maximum size.
    #[error("request body exceeds the limit of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The request body was not fully received before the read deadline.
    #[error("request body not received within {duration:?}")]
    RequestTimeout { duration: Duration },

    /// A tool did not finish before the execution deadline.
    #[error("tool `{name}` timed out after {duration:?}")]
    ToolTimeout { name: String, duration: Duration },

    /// The plugin owning a tool is not (or no longer) active.
    #[error("plugin `{plugin_id}` is not active")]
    PluginUnavailable { plugin_id: String },

    /// A plugin reported a failure from init, shutdown or a tool call.
    #[error("plugin `{plugin_id}` failed: {message}")]
    Plugin {
        plugin_id: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream chat-completion provider failed or is not configured.
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ToolgateError {
    /// Stable machine-readable code for the error kind, used in JSON error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ToolgateError::Config(_) => "config",
            ToolgateError::Manifest(_) => "manifest",
            ToolgateError::ToolNotFound { .. } => "not_found",
            ToolgateError::InvalidArgument(_) => "invalid_argument",
            ToolgateError::PayloadTooLarge { .. } => "payload_too_large",
            ToolgateError::RequestTimeout { .. } => "request_timeout",
            ToolgateError::ToolTimeout { .. } => "tool_timeout",
            ToolgateError::PluginUnavailable { .. } => "plugin_unavailable",
            ToolgateError::Plugin { .. } => "plugin_error",
            ToolgateError::Upstream { .. } => "upstream_error",
            ToolgateError::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for plugin failures without an underlying source.
    pub fn plugin(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        ToolgateError::Plugin {
            plugin_id: plugin_id.into(),
            message: message.into(),
            source: None,
        }
    }
}

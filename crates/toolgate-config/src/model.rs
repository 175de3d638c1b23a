// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Toolgate host.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

/// Top-level Toolgate configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ToolgateConfig {
    /// HTTP gateway settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Plugin discovery and capability policy.
    #[serde(default)]
    pub plugins: PluginsConfig,

    /// Upstream chat-completion provider.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum accepted request body size in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Deadline for receiving a complete request body.
    #[serde(default = "default_body_read_timeout_ms")]
    pub body_read_timeout_ms: u64,

    /// Deadline for a single tool execution.
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,
}

impl ServerConfig {
    pub fn body_read_timeout(&self) -> Duration {
        Duration::from_millis(self.body_read_timeout_ms)
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
            body_read_timeout_ms: default_body_read_timeout_ms(),
            tool_timeout_ms: default_tool_timeout_ms(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

fn default_max_body_bytes() -> usize {
    1_000_000
}

fn default_body_read_timeout_ms() -> u64 {
    5_000
}

fn default_tool_timeout_ms() -> u64 {
    30_000
}

/// Plugin discovery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PluginsConfig {
    /// Directory scanned for plugin bundles.
    #[serde(default = "default_plugins_dir")]
    pub dir: PathBuf,

    /// Capabilities plugins may request. Empty means dev mode (no enforcement).
    ///
    /// Accepts a TOML list or a comma-separated string, so
    /// `TOOLGATE_PLUGINS_ALLOWED_CAPABILITIES="fs.read,net.outbound"` works.
    #[serde(default, deserialize_with = "string_or_list")]
    pub allowed_capabilities: Vec<String>,

    /// Per-plugin configuration tables, keyed by plugin id.
    #[serde(default)]
    pub config: HashMap<String, serde_json::Value>,
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            dir: default_plugins_dir(),
            allowed_capabilities: Vec::new(),
            config: HashMap::new(),
        }
    }
}

fn default_plugins_dir() -> PathBuf {
    PathBuf::from("plugins")
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        One(String),
        Many(Vec<String>),
    }

    let items: Vec<String> = match Raw::deserialize(deserializer)? {
        Raw::One(s) => s.split(',').map(str::to_string).collect(),
        Raw::Many(v) => v,
    };
    Ok(items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

/// Upstream chat-completion provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// Base URL of an OpenAI-compatible API. `None` disables the chat proxy.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token sent upstream.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Request timeout in seconds.
    #[serde(default = "default_upstream_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum tool-execution rounds per chat request.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_secs: default_upstream_timeout_secs(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

fn default_upstream_timeout_secs() -> u64 {
    120
}

fn default_max_tool_rounds() -> usize {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Force debug-level logging regardless of `level`.
    #[serde(default)]
    pub debug: bool,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl LoggingConfig {
    /// The level actually in effect.
    pub fn effective_level(&self) -> &str {
        if self.debug { "debug" } else { &self.level }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ToolgateConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.max_body_bytes, 1_000_000);
        assert_eq!(config.server.body_read_timeout(), Duration::from_secs(5));
        assert_eq!(config.server.tool_timeout(), Duration::from_secs(30));
        assert_eq!(config.plugins.dir, PathBuf::from("plugins"));
        assert!(config.plugins.allowed_capabilities.is_empty());
        assert!(config.upstream.base_url.is_none());
        assert_eq!(config.upstream.max_tool_rounds, 5);
        assert_eq!(config.logging.effective_level(), "info");
    }

    #[test]
    fn capabilities_accept_list_or_comma_string() {
        let config: ToolgateConfig = toml::from_str(
            r#"
[plugins]
allowed_capabilities = ["fs.read", " net.outbound "]
"#,
        )
        .unwrap();
        assert_eq!(config.plugins.allowed_capabilities, vec!["fs.read", "net.outbound"]);

        let config: ToolgateConfig = toml::from_str(
            r#"
[plugins]
allowed_capabilities = "fs.read, net.outbound,"
"#,
        )
        .unwrap();
        assert_eq!(config.plugins.allowed_capabilities, vec!["fs.read", "net.outbound"]);
    }

    #[test]
    fn plugin_config_tables() {
        let config: ToolgateConfig = toml::from_str(
            r#"
[plugins.config.core-text]
ellipsis = "~"
"#,
        )
        .unwrap();
        assert_eq!(config.plugins.config["core-text"]["ellipsis"], "~");
    }

    #[test]
    fn debug_flag_overrides_level() {
        let logging = LoggingConfig {
            debug: true,
            level: "warn".to_string(),
        };
        assert_eq!(logging.effective_level(), "debug");
    }
}

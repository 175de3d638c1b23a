// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::ToolgateConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validates a deserialized configuration, collecting every failure.
pub fn validate_config(config: &ToolgateConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::validation("server.host must not be empty"));
    } else if host.parse::<std::net::IpAddr>().is_err()
        && !host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        errors.push(ConfigError::validation(format!(
            "server.host `{host}` is not a valid IP address or hostname"
        )));
    }

    if config.server.port == 0 {
        errors.push(ConfigError::validation("server.port must be between 1 and 65535"));
    }

    for (key, value) in [
        ("server.max_body_bytes", config.server.max_body_bytes as u64),
        ("server.body_read_timeout_ms", config.server.body_read_timeout_ms),
        ("server.tool_timeout_ms", config.server.tool_timeout_ms),
        ("upstream.timeout_secs", config.upstream.timeout_secs),
    ] {
        if value == 0 {
            errors.push(ConfigError::validation(format!("{key} must be greater than 0")));
        }
    }

    if config.plugins.dir.as_os_str().is_empty() {
        errors.push(ConfigError::validation("plugins.dir must not be empty"));
    }

    if let Some(url) = &config.upstream.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(ConfigError::validation(format!(
                "upstream.base_url `{url}` must start with http:// or https://"
            )));
        }
    }

    if config.upstream.max_tool_rounds == 0 {
        errors.push(ConfigError::validation("upstream.max_tool_rounds must be at least 1"));
    }

    let level = config.logging.level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::validation(format!(
            "logging.level `{}` is not one of: {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        )));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

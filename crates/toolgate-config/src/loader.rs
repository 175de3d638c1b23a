// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered configuration loading with Figment.
//!
//! Merge order (later overrides earlier):
//! 1. Compiled defaults
//! 2. `/etc/toolgate/toolgate.toml`
//! 3. `~/.config/toolgate/toolgate.toml`
//! 4. `./toolgate.toml`
//! 5. `TOOLGATE_*` environment variables

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::ToolgateConfig;

pub(crate) const SYSTEM_CONFIG: &str = "/etc/toolgate/toolgate.toml";
pub(crate) const LOCAL_CONFIG: &str = "toolgate.toml";

const SECTIONS: [&str; 4] = ["server", "plugins", "upstream", "logging"];

pub(crate) fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("toolgate/toolgate.toml"))
}

/// Builds the full layered Figment before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(ToolgateConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment.merge(Toml::file(LOCAL_CONFIG)).merge(env_provider())
}

/// Loads configuration from the standard hierarchy with env overrides.
pub fn load_config() -> Result<ToolgateConfig, figment::Error> {
    build_figment().extract()
}

/// Loads configuration from an explicit file, skipping the hierarchy.
/// Environment overrides still apply.
pub fn load_config_from_path(path: &Path) -> Result<ToolgateConfig, figment::Error> {
    if !path.is_file() {
        return Err(figment::Error::from(format!(
            "configuration file {} does not exist",
            path.display()
        )));
    }
    Figment::new()
        .merge(Serialized::defaults(ToolgateConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Loads configuration from a TOML string over the defaults. No env overrides.
pub fn load_config_from_str(toml_content: &str) -> Result<ToolgateConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(ToolgateConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// `TOOLGATE_SERVER_MAX_BODY_BYTES` maps to `server.max_body_bytes`.
///
/// Only the leading section name is split off, so underscores inside key names
/// survive. `TOOLGATE_DEBUG` is shorthand for `logging.debug`.
fn env_provider() -> Env {
    Env::prefixed("TOOLGATE_").map(|key| env_key(key.as_str()).into())
}

fn env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    if key == "debug" {
        return "logging.debug".to_string();
    }
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_on_section_only() {
        assert_eq!(env_key("server_max_body_bytes"), "server.max_body_bytes");
        assert_eq!(env_key("plugins_allowed_capabilities"), "plugins.allowed_capabilities");
        assert_eq!(env_key("upstream_base_url"), "upstream.base_url");
        assert_eq!(env_key("logging_level"), "logging.level");
        assert_eq!(env_key("debug"), "logging.debug");
        assert_eq!(env_key("unrelated"), "unrelated");
    }

    #[test]
    fn env_keys_arrive_in_original_case() {
        assert_eq!(env_key("SERVER_PORT"), "server.port");
        assert_eq!(env_key("SERVER_MAX_BODY_BYTES"), "server.max_body_bytes");
        assert_eq!(env_key("PLUGINS_ALLOWED_CAPABILITIES"), "plugins.allowed_capabilities");
        assert_eq!(env_key("Upstream_Api_Key"), "upstream.api_key");
        assert_eq!(env_key("DEBUG"), "logging.debug");
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_from_path(Path::new("/nonexistent/toolgate.toml")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}

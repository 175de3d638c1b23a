// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Toolgate plugin host.
//!
//! TOML files are merged over compiled defaults, overridden by `TOOLGATE_*`
//! environment variables, strictly deserialized (`deny_unknown_fields`) and
//! then semantically validated. Failures are reported as miette diagnostics
//! with typo suggestions.
//!
//! ```no_run
//! use toolgate_config::{load_and_validate, render_errors};
//!
//! match load_and_validate() {
//!     Ok(config) => println!("listening on port {}", config.server.port),
//!     Err(errors) => render_errors(&errors),
//! }
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{LoggingConfig, PluginsConfig, ServerConfig, ToolgateConfig, UpstreamConfig};

/// Loads the layered configuration and validates it.
pub fn load_and_validate() -> Result<ToolgateConfig, Vec<ConfigError>> {
    finish(loader::load_config(), collect_toml_sources)
}

/// Loads an explicit configuration file (plus env overrides) and validates it.
pub fn load_and_validate_path(path: &Path) -> Result<ToolgateConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        let display = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf())
            .display()
            .to_string();
        std::fs::read_to_string(path)
            .map(|content| vec![(display, content)])
            .unwrap_or_default()
    })
}

/// Loads configuration from a TOML string and validates it.
pub fn load_and_validate_str(toml_content: &str) -> Result<ToolgateConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

fn finish(
    loaded: Result<ToolgateConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<ToolgateConfig, Vec<ConfigError>> {
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(?config.server, "configuration loaded");
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err, &sources())),
    }
}

/// Reads the hierarchy's TOML files for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string(loader::LOCAL_CONFIG) {
        let path = std::env::current_dir()
            .map(|d| d.join(loader::LOCAL_CONFIG).display().to_string())
            .unwrap_or_else(|_| loader::LOCAL_CONFIG.to_string());
        sources.push((path, content));
    }

    if let Some(path) = loader::user_config_path() {
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    if let Ok(content) = std::fs::read_to_string(loader::SYSTEM_CONFIG) {
        sources.push((loader::SYSTEM_CONFIG.to_string(), content));
    }

    sources
}

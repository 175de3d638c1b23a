// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in plugin catalog.
//!
//! Returns hardcoded manifests for the plugins compiled into the host binary.
//! Each entry's `implementation` must match a factory key the bootstrap
//! registers.

use crate::manifest::{PluginManifest, Requirements};

/// Factory key of the built-in text utilities plugin.
pub const CORE_TEXT: &str = "toolgate.builtin.core-text";

/// Returns manifests for all built-in plugins, in load order.
pub fn builtin_catalog() -> Vec<PluginManifest> {
    vec![PluginManifest {
        id: "core-text".to_string(),
        version: toolgate_core::HOST_VERSION.to_string(),
        api_version: toolgate_core::API_VERSION.to_string(),
        implementation: CORE_TEXT.to_string(),
        capabilities: vec!["text.transform".to_string(), "json.read".to_string()],
        requires: Requirements::default(),
        name: Some("Core text".to_string()),
        description: Some("String and JSON utilities".to_string()),
    }]
}

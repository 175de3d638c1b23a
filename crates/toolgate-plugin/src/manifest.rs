// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin manifest parsing from `plugin.json`.
//!
//! The manifest carries a plugin's identity, the API it was built against, the
//! factory key used to construct it, the capabilities it wants, and optional
//! version constraints on the host.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use toolgate_core::ToolgateError;

/// Parsed plugin manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    /// Unique id of the plugin within one load cycle.
    pub id: String,
    /// Semantic version of the plugin itself.
    pub version: String,
    /// Plugin API version the plugin was built against.
    pub api_version: String,
    /// Opaque key of the construction factory. Never used to load code.
    pub implementation: String,
    /// Capabilities the plugin wants to exercise, in declaration order.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Optional constraints on the host and API versions.
    #[serde(default, deserialize_with = "lenient_requirements")]
    pub requires: Requirements,
    /// Optional display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Version range expressions a plugin places on its host.
///
/// A missing or non-string field means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api: Option<String>,
}

/// Reads `requires` without ever failing: anything that is not an object of
/// strings degrades to "unconstrained" so older bundles keep loading.
fn lenient_requirements<'de, D>(deserializer: D) -> Result<Requirements, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let field = |key: &str| {
        value
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };
    Ok(Requirements {
        host: field("host"),
        api: field("api"),
    })
}

/// Parse a plugin manifest from JSON content.
///
/// Validates that `id`, `version`, `apiVersion` and `implementation` are
/// non-empty, that `id` only uses `[A-Za-z0-9._-]`, and that `version` is a
/// semantic version.
pub fn parse_manifest(json: &str) -> Result<PluginManifest, ToolgateError> {
    let manifest: PluginManifest = serde_json::from_str(json)
        .map_err(|e| ToolgateError::Manifest(format!("invalid plugin.json: {e}")))?;

    for (field, value) in [
        ("id", &manifest.id),
        ("version", &manifest.version),
        ("apiVersion", &manifest.api_version),
        ("implementation", &manifest.implementation),
    ] {
        if value.trim().is_empty() {
            return Err(ToolgateError::Manifest(format!("{field} must not be empty")));
        }
    }

    if !manifest
        .id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ToolgateError::Manifest(format!(
            "id '{}' may only contain letters, digits, '.', '_' and '-'",
            manifest.id
        )));
    }

    semver::Version::parse(manifest.version.trim()).map_err(|e| {
        ToolgateError::Manifest(format!("version '{}' is not semver: {e}", manifest.version))
    })?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_manifest() {
        let json = r#"{
            "id": "ssh-exec",
            "version": "0.3.1",
            "apiVersion": "1.0.0",
            "implementation": "vendor.ssh",
            "capabilities": ["net.outbound", "ssh.exec"],
            "requires": {"host": ">=1.0.0 <2.0.0", "api": "1.0.x"}
        }"#;
        let manifest = parse_manifest(json).unwrap();
        assert_eq!(manifest.id, "ssh-exec");
        assert_eq!(manifest.api_version, "1.0.0");
        assert_eq!(manifest.capabilities, vec!["net.outbound", "ssh.exec"]);
        assert_eq!(manifest.requires.host.as_deref(), Some(">=1.0.0 <2.0.0"));
        assert_eq!(manifest.requires.api.as_deref(), Some("1.0.x"));
        assert!(manifest.name.is_none());
    }

    #[test]
    fn parse_minimal_manifest() {
        let json = r#"{"id":"m","version":"1.0.0","apiVersion":"1.0.0","implementation":"k"}"#;
        let manifest = parse_manifest(json).unwrap();
        assert!(manifest.capabilities.is_empty());
        assert_eq!(manifest.requires, Requirements::default());
    }

    #[test]
    fn malformed_requires_is_unconstrained() {
        let json = r#"{
            "id": "old", "version": "1.0.0", "apiVersion": "1.0.0",
            "implementation": "k", "requires": {"host": 5, "api": null}
        }"#;
        let manifest = parse_manifest(json).unwrap();
        assert_eq!(manifest.requires, Requirements::default());

        let json = r#"{
            "id": "old", "version": "1.0.0", "apiVersion": "1.0.0",
            "implementation": "k", "requires": "anything"
        }"#;
        assert_eq!(parse_manifest(json).unwrap().requires, Requirements::default());
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"id":"m","version":"1.0.0","apiVersion":"1.0.0","implementation":"k","homepage":"x"}"#;
        assert!(parse_manifest(json).is_ok());
    }

    #[test]
    fn empty_implementation_rejected() {
        let json = r#"{"id":"m","version":"1.0.0","apiVersion":"1.0.0","implementation":" "}"#;
        let err = parse_manifest(json).unwrap_err().to_string();
        assert!(err.contains("implementation must not be empty"));
    }

    #[test]
    fn missing_field_rejected() {
        let json = r#"{"id":"m","version":"1.0.0","implementation":"k"}"#;
        let err = parse_manifest(json).unwrap_err().to_string();
        assert!(err.contains("apiVersion"), "got: {err}");
    }

    #[test]
    fn bad_id_rejected() {
        let json = r#"{"id":"../etc","version":"1.0.0","apiVersion":"1.0.0","implementation":"k"}"#;
        assert!(parse_manifest(json).is_err());
    }

    #[test]
    fn non_semver_version_rejected() {
        let json = r#"{"id":"m","version":"latest","apiVersion":"1.0.0","implementation":"k"}"#;
        let err = parse_manifest(json).unwrap_err().to_string();
        assert!(err.contains("not semver"));
    }

    #[test]
    fn not_json_rejected() {
        assert!(parse_manifest("id = 'toml'").is_err());
    }
}

// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `tools` and `check-manifest` commands.

use std::path::Path;

use serde_json::{json, Value};
use toolgate_config::ToolgateConfig;
use toolgate_core::ToolgateError;
use toolgate_plugin::{
    parse_manifest, resolve, Bundle, HostVersions, PluginManifest, Resolution, MANIFEST_FILE,
};

use crate::serve::{assemble, capability_policy, factories};

/// Loads every plugin, prints the catalogue as JSON, then shuts plugins down.
pub async fn run_tools(config: &ToolgateConfig) -> Result<(), ToolgateError> {
    let host = assemble(config).await;
    let rendered = serde_json::to_string_pretty(&host.registry.list_tools())
        .map_err(|e| ToolgateError::Internal(format!("failed to render tool catalogue: {e}")));
    host.manager.shutdown_all().await;
    println!("{}", rendered?);
    Ok(())
}

/// Prints the admission verdict for the bundle at `path`.
///
/// Returns whether the plugin would be admitted.
pub fn check_manifest(path: &Path, config: &ToolgateConfig) -> Result<bool, ToolgateError> {
    let manifest = read_manifest(path)?;
    let report = admission_report(&manifest, config);
    let admissible = report["admissible"].as_bool().unwrap_or(false);

    let rendered = serde_json::to_string_pretty(&report)
        .map_err(|e| ToolgateError::Internal(format!("failed to render report: {e}")))?;
    println!("{rendered}");
    Ok(admissible)
}

fn read_manifest(path: &Path) -> Result<PluginManifest, ToolgateError> {
    if path.is_file() && path.file_name().is_some_and(|n| n == MANIFEST_FILE) {
        let text = std::fs::read_to_string(path).map_err(|e| {
            ToolgateError::Manifest(format!("cannot read {}: {e}", path.display()))
        })?;
        return parse_manifest(&text);
    }

    Bundle::from_path(path)
        .ok_or_else(|| {
            ToolgateError::Manifest(format!(
                "{} is not a bundle directory, .tar.gz archive or {MANIFEST_FILE}",
                path.display()
            ))
        })?
        .read_manifest()
}

/// Runs the resolver, the capability policy and the factory lookup
/// independently so every failing check is reported.
fn admission_report(manifest: &PluginManifest, config: &ToolgateConfig) -> Value {
    let host = HostVersions::current();

    let resolution = resolve(manifest, &host);
    let policy = capability_policy(config);
    let capabilities = policy.enforce(&manifest.id, &manifest.capabilities);
    let factory_known = factories().contains(&manifest.implementation);

    let version_verdict = match &resolution {
        Resolution::Admit => json!({ "admitted": true }),
        Resolution::Reject(reason) => json!({ "admitted": false, "reason": reason }),
    };
    let capability_verdict = match &capabilities {
        Ok(()) => json!({ "admitted": true, "devMode": policy.is_dev_mode() }),
        Err(violation) => json!({ "admitted": false, "denied": violation.denied }),
    };

    json!({
        "id": manifest.id,
        "version": manifest.version,
        "apiVersion": manifest.api_version,
        "implementation": manifest.implementation,
        "host": { "version": host.host.to_string(), "apiVersion": host.api.to_string() },
        "versions": version_verdict,
        "capabilities": capability_verdict,
        "factoryRegistered": factory_known,
        "admissible": resolution.is_admitted() && capabilities.is_ok() && factory_known,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(api: &str, implementation: &str, caps: &[&str]) -> PluginManifest {
        parse_manifest(
            &json!({
                "id": "sample",
                "version": "0.1.0",
                "apiVersion": api,
                "implementation": implementation,
                "capabilities": caps,
            })
            .to_string(),
        )
        .unwrap()
    }

    #[test]
    fn admissible_builtin_implementation() {
        let report = admission_report(
            &manifest("1.0.0", toolgate_plugin::CORE_TEXT, &["text.transform"]),
            &ToolgateConfig::default(),
        );
        assert_eq!(report["admissible"], true);
        assert_eq!(report["capabilities"]["devMode"], true);
    }

    #[test]
    fn every_failing_check_is_reported() {
        let mut config = ToolgateConfig::default();
        config.plugins.allowed_capabilities = vec!["json.read".to_string()];

        let report = admission_report(&manifest("2.0.0", "com.example.Missing", &["fs.write"]), &config);
        assert_eq!(report["admissible"], false);
        assert_eq!(report["versions"]["admitted"], false);
        assert_eq!(report["capabilities"]["denied"], json!(["fs.write"]));
        assert_eq!(report["factoryRegistered"], false);
    }

    #[test]
    fn reads_plain_manifest_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE);
        std::fs::write(
            &path,
            r#"{"id":"file","version":"1.0.0","apiVersion":"1.0.0","implementation":"x"}"#,
        )
        .unwrap();
        assert_eq!(read_manifest(&path).unwrap().id, "file");
        assert_eq!(read_manifest(dir.path()).unwrap().id, "file");
    }

    #[test]
    fn rejects_non_bundle_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hi").unwrap();
        assert!(matches!(read_manifest(&path), Err(ToolgateError::Manifest(_))));
    }
}

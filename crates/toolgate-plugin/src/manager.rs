// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin lifecycle manager.
//!
//! Admission runs strictly in this order: manifest, version resolution,
//! capability policy, factory lookup, construction, `init`. A plugin that fails
//! any step is skipped with a warning; one bad bundle never stops the others
//! from loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use toolgate_core::{PluginContext, PluginHandle, ToolgateError};
use tracing::{debug, info, warn};

use crate::bundle::{discover_bundles, Bundle};
use crate::capability::{CapabilityPolicy, CapabilityViolation};
use crate::factory::FactoryRegistry;
use crate::manifest::PluginManifest;
use crate::version::{resolve, HostVersions, Resolution};

/// Why a plugin was not admitted.
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error("manifest unreadable: {0}")]
    Manifest(ToolgateError),

    #[error("version requirements not met: {0}")]
    Version(String),

    #[error(transparent)]
    Capability(#[from] CapabilityViolation),

    #[error("no factory registered for implementation `{0}`")]
    UnknownImplementation(String),

    #[error("plugin id `{0}` is already loaded")]
    DuplicateId(String),

    #[error("init failed: {0}")]
    Init(ToolgateError),
}

/// Where an admitted plugin came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginSource {
    /// Compiled into the host.
    Builtin,
    /// Loaded from a bundle on disk.
    Bundle(PathBuf),
}

impl std::fmt::Display for PluginSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginSource::Builtin => write!(f, "builtin"),
            PluginSource::Bundle(path) => write!(f, "{}", path.display()),
        }
    }
}

/// An admitted, initialised plugin.
#[derive(Debug)]
pub struct LoadedPlugin {
    pub manifest: PluginManifest,
    pub source: PluginSource,
    pub handle: Arc<PluginHandle>,
}

/// Static inputs to plugin admission.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub host: HostVersions,
    pub policy: CapabilityPolicy,
    /// Per-plugin configuration tables, keyed by plugin id.
    pub plugin_config: HashMap<String, Value>,
}

impl ManagerConfig {
    pub fn new(host: HostVersions, policy: CapabilityPolicy) -> Self {
        Self {
            host,
            policy,
            plugin_config: HashMap::new(),
        }
    }
}

/// Discovers, admits, initialises and shuts down plugins.
pub struct PluginManager {
    config: ManagerConfig,
    factories: Arc<FactoryRegistry>,
    loaded: Vec<LoadedPlugin>,
}

impl PluginManager {
    pub fn new(config: ManagerConfig, factories: Arc<FactoryRegistry>) -> Self {
        Self {
            config,
            factories,
            loaded: Vec::new(),
        }
    }

    /// Plugins admitted so far, in load order.
    pub fn loaded(&self) -> &[LoadedPlugin] {
        &self.loaded
    }

    pub fn policy(&self) -> &CapabilityPolicy {
        &self.config.policy
    }

    /// Runs every admission check that does not need an instance.
    pub fn evaluate(&self, manifest: &PluginManifest) -> Result<(), AdmissionError> {
        if self.loaded.iter().any(|p| p.manifest.id == manifest.id) {
            return Err(AdmissionError::DuplicateId(manifest.id.clone()));
        }

        if let Resolution::Reject(reason) = resolve(manifest, &self.config.host) {
            return Err(AdmissionError::Version(reason));
        }

        self.config
            .policy
            .enforce(&manifest.id, &manifest.capabilities)?;

        if !self.factories.contains(&manifest.implementation) {
            return Err(AdmissionError::UnknownImplementation(
                manifest.implementation.clone(),
            ));
        }

        Ok(())
    }

    /// Admits a compiled-in plugin described by `manifest`.
    pub async fn load_builtin(
        &mut self,
        manifest: PluginManifest,
    ) -> Result<&LoadedPlugin, AdmissionError> {
        self.admit(manifest, PluginSource::Builtin, None).await
    }

    /// Admits the plugin packaged in `bundle`.
    pub async fn load_bundle(&mut self, bundle: &Bundle) -> Result<&LoadedPlugin, AdmissionError> {
        let manifest = bundle.read_manifest().map_err(AdmissionError::Manifest)?;
        let data_dir = bundle.data_dir().map(Path::to_path_buf);
        self.admit(manifest, PluginSource::Bundle(bundle.path.clone()), data_dir)
            .await
    }

    /// Loads every bundle in `dir`, returning how many were admitted.
    ///
    /// A missing directory loads nothing.
    pub async fn load_directory(&mut self, dir: &Path) -> usize {
        let bundles = match discover_bundles(dir) {
            Ok(bundles) => bundles,
            Err(e) => {
                info!(dir = %dir.display(), error = %e, "plugin directory not readable, no bundles loaded");
                return 0;
            }
        };

        let mut admitted = 0;
        for bundle in &bundles {
            match self.load_bundle(bundle).await {
                Ok(plugin) => {
                    info!(
                        plugin = %plugin.manifest.id,
                        version = %plugin.manifest.version,
                        bundle = %bundle.path.display(),
                        "plugin loaded"
                    );
                    admitted += 1;
                }
                Err(e) => {
                    warn!(bundle = %bundle.path.display(), error = %e, "skipping plugin bundle");
                }
            }
        }

        info!(
            dir = %dir.display(),
            discovered = bundles.len(),
            admitted,
            "plugin directory scanned"
        );
        admitted
    }

    async fn admit(
        &mut self,
        manifest: PluginManifest,
        source: PluginSource,
        data_dir: Option<PathBuf>,
    ) -> Result<&LoadedPlugin, AdmissionError> {
        self.evaluate(&manifest)?;

        let instance = self
            .factories
            .create(&manifest.implementation)
            .ok_or_else(|| AdmissionError::UnknownImplementation(manifest.implementation.clone()))?;
        let handle = Arc::new(PluginHandle::new(manifest.id.clone(), instance));

        let ctx = PluginContext {
            host_version: self.config.host.host.clone(),
            api_version: self.config.host.api.clone(),
            config: self
                .config
                .plugin_config
                .get(&manifest.id)
                .cloned()
                .unwrap_or_else(|| Value::Object(Default::default())),
            data_dir,
        };
        handle.init(&ctx).await.map_err(AdmissionError::Init)?;
        debug!(plugin = %manifest.id, source = %source, "plugin admitted");

        self.loaded.push(LoadedPlugin {
            manifest,
            source,
            handle,
        });
        Ok(&self.loaded[self.loaded.len() - 1])
    }

    /// Shuts every loaded plugin down in load order.
    ///
    /// Failures are logged and counted; they never stop later plugins from
    /// being shut down. Calling this twice is harmless.
    pub async fn shutdown_all(&self) -> usize {
        let mut failures = 0;
        for plugin in &self.loaded {
            match plugin.handle.shutdown().await {
                Ok(()) => debug!(plugin = %plugin.manifest.id, "plugin shut down"),
                Err(e) => {
                    failures += 1;
                    warn!(plugin = %plugin.manifest.id, error = %e, "plugin shutdown failed");
                }
            }
        }
        info!(count = self.loaded.len(), failures, "plugins shut down");
        failures
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("config", &self.config)
            .field("factories", &self.factories)
            .field("loaded", &self.loaded.len())
            .finish()
    }
}

// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host bootstrap and the `serve` command.
//!
//! Plugins are admitted (built-ins first, then bundles from the plugin
//! directory), their tools registered, and the gateway served until a
//! shutdown signal arrives. Every loaded plugin is then shut down in load
//! order.

use std::sync::Arc;

use toolgate_config::{LoggingConfig, ToolgateConfig};
use toolgate_core::{Plugin, ToolgateError};
use toolgate_gateway::{start_server, ChatConfig, ChatProxy, GatewayState, Limits, ServerConfig};
use toolgate_plugin::{
    builtin_catalog, CapabilityPolicy, FactoryRegistry, HostVersions, ManagerConfig,
    PluginManager, CORE_TEXT,
};
use toolgate_tools::builtin::CoreTextPlugin;
use toolgate_tools::ToolRegistry;
use tracing::{info, warn};

use crate::shutdown;

/// Loaded plugins and the registry built from their tools.
pub struct Host {
    pub manager: PluginManager,
    pub registry: Arc<ToolRegistry>,
}

/// Constructors for every plugin implementation compiled into this binary.
pub fn factories() -> FactoryRegistry {
    let mut factories = FactoryRegistry::new();
    factories.register(CORE_TEXT, || Arc::new(CoreTextPlugin::new()) as Arc<dyn Plugin>);
    factories
}

pub fn capability_policy(config: &ToolgateConfig) -> CapabilityPolicy {
    CapabilityPolicy::from_list(&config.plugins.allowed_capabilities)
}

/// Admits all plugins and registers their tools.
///
/// Plugin failures are logged and skipped; this never fails.
pub async fn assemble(config: &ToolgateConfig) -> Host {
    let policy = capability_policy(config);
    if policy.is_dev_mode() {
        warn!("no capability allow-list configured, every capability is allowed");
    }

    let mut manager_config = ManagerConfig::new(HostVersions::current(), policy);
    manager_config.plugin_config = config.plugins.config.clone();
    let mut manager = PluginManager::new(manager_config, Arc::new(factories()));

    for manifest in builtin_catalog() {
        let id = manifest.id.clone();
        match manager.load_builtin(manifest).await {
            Ok(plugin) => info!(plugin = %plugin.manifest.id, "built-in plugin loaded"),
            Err(e) => warn!(plugin = %id, error = %e, "skipping built-in plugin"),
        }
    }
    manager.load_directory(&config.plugins.dir).await;

    let mut registry = ToolRegistry::new();
    for plugin in manager.loaded() {
        registry.register_plugin(&plugin.handle);
    }
    info!(
        plugins = manager.loaded().len(),
        tools = registry.len(),
        "tool registry ready"
    );

    Host {
        manager,
        registry: Arc::new(registry),
    }
}

fn chat_proxy(config: &ToolgateConfig) -> Result<Option<Arc<ChatProxy>>, ToolgateError> {
    let Some(base_url) = &config.upstream.base_url else {
        info!("no upstream configured, chat-completion proxy disabled");
        return Ok(None);
    };
    let proxy = ChatProxy::new(ChatConfig {
        base_url: base_url.clone(),
        api_key: config.upstream.api_key.clone(),
        timeout: std::time::Duration::from_secs(config.upstream.timeout_secs),
        max_tool_rounds: config.upstream.max_tool_rounds,
    })?;
    info!(base_url = %base_url, "chat-completion proxy enabled");
    Ok(Some(Arc::new(proxy)))
}

pub fn limits(config: &ToolgateConfig) -> Limits {
    Limits {
        max_body_bytes: config.server.max_body_bytes,
        body_read_timeout: config.server.body_read_timeout(),
        tool_timeout: config.server.tool_timeout(),
    }
}

/// Runs the host until SIGINT/SIGTERM.
pub async fn run_serve(config: ToolgateConfig) -> Result<(), ToolgateError> {
    info!(version = toolgate_core::HOST_VERSION, "starting toolgate");

    let chat = chat_proxy(&config)?;
    let host = assemble(&config).await;

    let state = GatewayState {
        registry: Arc::clone(&host.registry),
        limits: limits(&config),
        chat,
    };
    let server = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };

    let cancel = shutdown::install_signal_handler();
    let result = start_server(&server, state, cancel.clone()).await;
    cancel.cancel();

    host.manager.shutdown_all().await;
    info!("toolgate shutdown complete");
    result
}

/// Initializes the tracing subscriber. `RUST_LOG` takes precedence.
pub fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let level = logging.effective_level().to_ascii_lowercase();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("toolgate={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

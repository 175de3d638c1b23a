// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The plugin contract and its lifecycle handle.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use futures::FutureExt;
use tracing::debug;

use crate::error::ToolgateError;
use crate::tool::ToolFunction;

/// Context handed to [`Plugin::init`].
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Version of the running host.
    pub host_version: semver::Version,
    /// Plugin API version the host implements.
    pub api_version: semver::Version,
    /// The plugin's own configuration table (`{}` when none is configured).
    pub config: serde_json::Value,
    /// Root of the plugin's bundle, for directory bundles.
    pub data_dir: Option<PathBuf>,
}

/// The tool-provider contract every plugin implements.
///
/// Built-in and bundle plugins are indistinguishable to the host: both are
/// constructed through a registered factory, initialised once, asked for their
/// tool table, and shut down when the host terminates.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Prepares the plugin. Called exactly once, after admission checks pass.
    async fn init(&self, ctx: &PluginContext) -> Result<(), ToolgateError>;

    /// Returns the plugin's declaratively described tool functions.
    ///
    /// Takes `Arc<Self>` so handlers can keep the plugin alive.
    fn tools(self: Arc<Self>) -> Vec<ToolFunction>;

    /// Releases resources. Called at most once, after a successful `init`.
    async fn shutdown(&self) -> Result<(), ToolgateError>;
}

/// Lifecycle state of a plugin instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginState {
    /// Constructed, `init` not yet run.
    Created,
    /// `init` succeeded; tools may be invoked.
    Active,
    /// `init` failed or `shutdown` has run.
    Stopped,
}

impl PluginState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => PluginState::Created,
            1 => PluginState::Active,
            _ => PluginState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            PluginState::Created => 0,
            PluginState::Active => 1,
            PluginState::Stopped => 2,
        }
    }
}

impl std::fmt::Display for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PluginState::Created => write!(f, "created"),
            PluginState::Active => write!(f, "active"),
            PluginState::Stopped => write!(f, "stopped"),
        }
    }
}

/// A live plugin instance together with its lifecycle state.
///
/// Shared between the plugin manager (which drives `init`/`shutdown`) and the
/// tool registry (which refuses calls unless the handle is active).
pub struct PluginHandle {
    id: String,
    instance: Arc<dyn Plugin>,
    state: AtomicU8,
}

impl PluginHandle {
    pub fn new(id: impl Into<String>, instance: Arc<dyn Plugin>) -> Self {
        Self {
            id: id.into(),
            instance,
            state: AtomicU8::new(PluginState::Created.as_u8()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> PluginState {
        PluginState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state() == PluginState::Active
    }

    /// Runs `init` once. A failed `init` leaves the handle stopped.
    pub async fn init(&self, ctx: &PluginContext) -> Result<(), ToolgateError> {
        if self
            .state
            .compare_exchange(
                PluginState::Created.as_u8(),
                PluginState::Stopped.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Err(ToolgateError::plugin(
                &self.id,
                format!("cannot init plugin in state {}", self.state()),
            ));
        }

        AssertUnwindSafe(self.instance.init(ctx))
            .catch_unwind()
            .await
            .map_err(|panic| self.panicked("init", panic))??;
        self.state
            .store(PluginState::Active.as_u8(), Ordering::Release);
        debug!(plugin = %self.id, "plugin initialised");
        Ok(())
    }

    /// Runs `shutdown` if the plugin is active; otherwise does nothing.
    ///
    /// The handle is stopped afterwards whether or not `shutdown` succeeded.
    pub async fn shutdown(&self) -> Result<(), ToolgateError> {
        if self
            .state
            .compare_exchange(
                PluginState::Active.as_u8(),
                PluginState::Stopped.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Ok(());
        }
        AssertUnwindSafe(self.instance.shutdown())
            .catch_unwind()
            .await
            .map_err(|panic| self.panicked("shutdown", panic))?
    }

    fn panicked(&self, phase: &str, panic: Box<dyn Any + Send>) -> ToolgateError {
        let detail = panic
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| panic.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        ToolgateError::plugin(&self.id, format!("{phase} panicked: {detail}"))
    }

    /// The plugin's tool table.
    pub fn tools(&self) -> Vec<ToolFunction> {
        Arc::clone(&self.instance).tools()
    }
}

impl std::fmt::Debug for PluginHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginHandle")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingPlugin {
        inits: AtomicUsize,
        shutdowns: AtomicUsize,
        fail_init: bool,
    }

    #[async_trait]
    impl Plugin for CountingPlugin {
        async fn init(&self, _ctx: &PluginContext) -> Result<(), ToolgateError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            if self.fail_init {
                return Err(ToolgateError::plugin("counting", "boom"));
            }
            Ok(())
        }

        fn tools(self: Arc<Self>) -> Vec<ToolFunction> {
            Vec::new()
        }

        async fn shutdown(&self) -> Result<(), ToolgateError> {
            self.shutdowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn ctx() -> PluginContext {
        PluginContext {
            host_version: semver::Version::new(1, 0, 0),
            api_version: semver::Version::new(1, 0, 0),
            config: serde_json::json!({}),
            data_dir: None,
        }
    }

    #[tokio::test]
    async fn init_then_shutdown_runs_each_once() {
        let plugin = Arc::new(CountingPlugin::default());
        let handle = PluginHandle::new("counting", plugin.clone());
        assert_eq!(handle.state(), PluginState::Created);

        handle.init(&ctx()).await.unwrap();
        assert!(handle.is_active());
        assert!(handle.init(&ctx()).await.is_err());

        handle.shutdown().await.unwrap();
        handle.shutdown().await.unwrap();
        assert_eq!(handle.state(), PluginState::Stopped);
        assert_eq!(plugin.inits.load(Ordering::SeqCst), 1);
        assert_eq!(plugin.shutdowns.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_init_stops_handle_and_skips_shutdown() {
        let plugin = Arc::new(CountingPlugin {
            fail_init: true,
            ..Default::default()
        });
        let handle = PluginHandle::new("counting", plugin.clone());
        assert!(handle.init(&ctx()).await.is_err());
        assert_eq!(handle.state(), PluginState::Stopped);

        handle.shutdown().await.unwrap();
        assert_eq!(plugin.shutdowns.load(Ordering::SeqCst), 0);
    }

    struct PanickingPlugin {
        in_init: bool,
    }

    #[async_trait]
    impl Plugin for PanickingPlugin {
        async fn init(&self, _ctx: &PluginContext) -> Result<(), ToolgateError> {
            if self.in_init {
                panic!("init exploded");
            }
            Ok(())
        }

        fn tools(self: Arc<Self>) -> Vec<ToolFunction> {
            Vec::new()
        }

        async fn shutdown(&self) -> Result<(), ToolgateError> {
            panic!("shutdown exploded");
        }
    }

    #[tokio::test]
    async fn panicking_init_becomes_error() {
        let handle = PluginHandle::new("bad", Arc::new(PanickingPlugin { in_init: true }));
        let err = handle.init(&ctx()).await.unwrap_err();
        assert!(err.to_string().contains("init panicked: init exploded"), "{err}");
        assert_eq!(handle.state(), PluginState::Stopped);
    }

    #[tokio::test]
    async fn panicking_shutdown_becomes_error_and_stops_handle() {
        let handle = PluginHandle::new("bad", Arc::new(PanickingPlugin { in_init: false }));
        handle.init(&ctx()).await.unwrap();

        let err = handle.shutdown().await.unwrap_err();
        assert!(err.to_string().contains("shutdown panicked"), "{err}");
        assert_eq!(handle.state(), PluginState::Stopped);
        handle.shutdown().await.unwrap();
    }
}

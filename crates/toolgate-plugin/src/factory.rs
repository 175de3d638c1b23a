// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registry of compiled-in plugin constructors.
//!
//! A manifest's `implementation` string is only ever used as a key into this
//! registry. A bundle can be instantiated only if the host operator compiled in
//! and registered a constructor under that exact key; nothing is loaded
//! dynamically.

use std::collections::HashMap;
use std::sync::Arc;

use toolgate_core::Plugin;
use tracing::warn;

/// Zero-argument constructor producing a fresh plugin instance.
pub type PluginConstructor = Arc<dyn Fn() -> Arc<dyn Plugin> + Send + Sync>;

/// Maps implementation keys to constructors. Populated once at startup.
#[derive(Default)]
pub struct FactoryRegistry {
    constructors: HashMap<String, PluginConstructor>,
}

impl FactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a constructor under `key`, replacing any previous one.
    pub fn register<F>(&mut self, key: impl Into<String>, constructor: F)
    where
        F: Fn() -> Arc<dyn Plugin> + Send + Sync + 'static,
    {
        let key = key.into();
        if self
            .constructors
            .insert(key.clone(), Arc::new(constructor))
            .is_some()
        {
            warn!(implementation = %key, "plugin factory replaced");
        }
    }

    /// Constructs a new instance for `key`, if a constructor is registered.
    pub fn create(&self, key: &str) -> Option<Arc<dyn Plugin>> {
        self.constructors.get(key).map(|ctor| ctor())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl std::fmt::Debug for FactoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

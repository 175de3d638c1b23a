// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugin admission and lifecycle for the Toolgate host.
//!
//! Provides manifest parsing, the version constraint resolver, the capability
//! allow-list, the construction factory registry and the [`PluginManager`]
//! that ties them together.

pub mod bundle;
pub mod capability;
pub mod catalog;
pub mod factory;
pub mod manager;
pub mod manifest;
pub mod version;

pub use bundle::{discover_bundles, Bundle, BundleKind, MANIFEST_FILE};
pub use capability::{CapabilityPolicy, CapabilityViolation};
pub use catalog::{builtin_catalog, CORE_TEXT};
pub use factory::{FactoryRegistry, PluginConstructor};
pub use manager::{AdmissionError, LoadedPlugin, ManagerConfig, PluginManager, PluginSource};
pub use manifest::{parse_manifest, PluginManifest, Requirements};
pub use version::{api_compatible, resolve, satisfies, HostVersions, Resolution, VersionConstraint};

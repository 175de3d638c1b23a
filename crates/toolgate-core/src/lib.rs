// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Toolgate plugin host.
//!
//! This crate provides the plugin contract, the declarative tool descriptor
//! types plugins use to expose callable functions, and the error taxonomy
//! shared by the plugin manager, tool registry and HTTP gateway.

pub mod error;
pub mod plugin;
pub mod tool;

pub use error::ToolgateError;
pub use plugin::{Plugin, PluginContext, PluginHandle, PluginState};
pub use tool::{
    ParamSpec, ParamType, ParameterDoc, ToolArgs, ToolDescriptor, ToolFunction, ToolFuture,
    ToolHandler,
};

/// Version of the running host.
pub const HOST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Plugin API version implemented by this host.
pub const API_VERSION: &str = "1.0.0";

/// Parsed [`HOST_VERSION`].
pub fn host_version() -> semver::Version {
    semver::Version::parse(HOST_VERSION).unwrap_or_else(|_| semver::Version::new(0, 0, 0))
}

/// Parsed [`API_VERSION`].
pub fn api_version() -> semver::Version {
    semver::Version::parse(API_VERSION).unwrap_or_else(|_| semver::Version::new(0, 0, 0))
}

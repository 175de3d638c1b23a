// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tool registry and built-in plugins for the Toolgate host.
//!
//! The [`ToolRegistry`] turns the declarative tool tables plugins return into
//! schema-validated, callable targets and renders the catalogue for OpenAI
//! function calling.
//!
//! Built-in plugins:
//! - [`builtin::CoreTextPlugin`] -- string and JSON utilities

pub mod builtin;
pub mod coerce;
pub mod registry;

pub use registry::{ParameterDefinition, ToolDefinition, ToolRegistry};

// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plugins compiled into the host.
//!
//! These are admitted through the same factory and manager path as bundles;
//! the host only needs to register their constructors.

pub mod core_text;

pub use core_text::CoreTextPlugin;

// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability allow-list enforced before a plugin is initialised.
//!
//! An empty allow-list is dev mode: every capability is implicitly allowed.
//! This is a declared-intent gate, not a sandbox.

use std::collections::BTreeSet;

use thiserror::Error;

/// A plugin asked for capabilities the policy does not allow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "plugin `{plugin_id}` requests capabilities outside the allow-list: {}",
    .denied.join(", ")
)]
pub struct CapabilityViolation {
    pub plugin_id: String,
    /// Offending capabilities in manifest order, without duplicates.
    pub denied: Vec<String>,
}

/// The operator-configured set of allowed capability identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityPolicy {
    allowed: BTreeSet<String>,
}

impl CapabilityPolicy {
    /// A policy that enforces nothing.
    pub fn dev_mode() -> Self {
        Self::default()
    }

    /// Builds a policy from capability ids, trimming whitespace and dropping blanks.
    pub fn from_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Self { allowed }
    }

    /// Parses a comma-separated allow-list such as `"fs.read, net.outbound"`.
    pub fn from_comma_separated(list: &str) -> Self {
        Self::from_list(list.split(','))
    }

    pub fn is_dev_mode(&self) -> bool {
        self.allowed.is_empty()
    }

    /// Allowed capability ids, sorted.
    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    pub fn allows(&self, capability: &str) -> bool {
        self.is_dev_mode() || self.allowed.contains(capability)
    }

    /// Checks `requested` against the allow-list.
    pub fn enforce(&self, plugin_id: &str, requested: &[String]) -> Result<(), CapabilityViolation> {
        if self.is_dev_mode() {
            return Ok(());
        }

        let mut denied: Vec<String> = Vec::new();
        for cap in requested {
            if !self.allowed.contains(cap) && !denied.contains(cap) {
                denied.push(cap.clone());
            }
        }

        if denied.is_empty() {
            Ok(())
        } else {
            Err(CapabilityViolation {
                plugin_id: plugin_id.to_string(),
                denied,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn dev_mode_allows_everything() {
        let policy = CapabilityPolicy::dev_mode();
        assert!(policy.is_dev_mode());
        assert!(policy.enforce("p", &caps(&["anything", "at.all"])).is_ok());
        assert!(policy.allows("whatever"));
    }

    #[test]
    fn subset_is_allowed() {
        let policy = CapabilityPolicy::from_list(["fs.read", "net.outbound"]);
        assert!(policy.enforce("p", &caps(&["fs.read"])).is_ok());
        assert!(policy.enforce("p", &[]).is_ok());
    }

    #[test]
    fn violation_names_plugin_and_capabilities() {
        let policy = CapabilityPolicy::from_list(["fs.read"]);
        let err = policy
            .enforce("ssh", &caps(&["ssh.exec", "fs.read", "net.raw", "ssh.exec"]))
            .unwrap_err();
        assert_eq!(err.plugin_id, "ssh");
        assert_eq!(err.denied, vec!["ssh.exec", "net.raw"]);
        let msg = err.to_string();
        assert!(msg.contains("`ssh`"));
        assert!(msg.contains("ssh.exec, net.raw"));
    }

    #[test]
    fn comma_separated_list_is_trimmed() {
        let policy = CapabilityPolicy::from_comma_separated(" a, b ,,c, ");
        assert_eq!(policy.allowed().collect::<Vec<_>>(), vec!["a", "b", "c"]);

        let empty = CapabilityPolicy::from_comma_separated(" , ");
        assert!(empty.is_dev_mode());
    }
}

// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Version constraint grammar and manifest resolution.
//!
//! Four forms are understood:
//!
//! | Form | Example | Meaning |
//! |---|---|---|
//! | wildcard | `*` | any version |
//! | exact | `1.2.3` | exactly this version |
//! | minor wildcard | `1.0.x` | same major and minor, any patch |
//! | bounded range | `>=1.0.0 <2.0.0` | inclusive lower, exclusive upper |
//!
//! Resolution never fails on malformed input: an expression that does not
//! parse constrains nothing.

use std::fmt;

use semver::Version;
use tracing::debug;

use crate::manifest::PluginManifest;

/// A parsed version constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    Any,
    Exact(Version),
    MinorWildcard { major: u64, minor: u64 },
    Range { lower: Version, upper: Version },
}

impl VersionConstraint {
    /// Parses an expression, rejecting anything outside the grammar.
    pub fn parse_strict(expr: &str) -> Result<Self, String> {
        let expr = expr.trim();
        if expr.is_empty() || expr == "*" {
            return Ok(VersionConstraint::Any);
        }

        if let Some(rest) = expr.strip_prefix(">=") {
            let (lower, upper) = rest
                .split_once('<')
                .ok_or_else(|| format!("range '{expr}' is missing an upper bound"))?;
            if upper.starts_with('=') {
                return Err(format!("range '{expr}' must use an exclusive upper bound"));
            }
            let lower = parse_version(lower)?;
            let upper = parse_version(upper)?;
            if lower >= upper {
                return Err(format!("range '{expr}' is empty"));
            }
            return Ok(VersionConstraint::Range { lower, upper });
        }

        if let Some(prefix) = expr
            .strip_suffix(".x")
            .or_else(|| expr.strip_suffix(".X"))
            .or_else(|| expr.strip_suffix(".*"))
        {
            let (major, minor) = prefix
                .split_once('.')
                .ok_or_else(|| format!("wildcard '{expr}' needs major.minor.x"))?;
            let major = major
                .parse::<u64>()
                .map_err(|e| format!("wildcard '{expr}': bad major: {e}"))?;
            let minor = minor
                .parse::<u64>()
                .map_err(|e| format!("wildcard '{expr}': bad minor: {e}"))?;
            return Ok(VersionConstraint::MinorWildcard { major, minor });
        }

        parse_version(expr).map(VersionConstraint::Exact)
    }

    /// Parses an expression, treating malformed input as [`VersionConstraint::Any`].
    pub fn parse(expr: &str) -> Self {
        Self::parse_strict(expr).unwrap_or_else(|reason| {
            debug!(expr, reason = %reason, "malformed version constraint treated as wildcard");
            VersionConstraint::Any
        })
    }

    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(v) => version == v,
            VersionConstraint::MinorWildcard { major, minor } => {
                version.major == *major && version.minor == *minor
            }
            VersionConstraint::Range { lower, upper } => version >= lower && version < upper,
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Any => write!(f, "*"),
            VersionConstraint::Exact(v) => write!(f, "{v}"),
            VersionConstraint::MinorWildcard { major, minor } => write!(f, "{major}.{minor}.x"),
            VersionConstraint::Range { lower, upper } => write!(f, ">={lower} <{upper}"),
        }
    }
}

fn parse_version(s: &str) -> Result<Version, String> {
    let s = s.trim();
    Version::parse(s).map_err(|e| format!("'{s}' is not a semantic version: {e}"))
}

/// Whether an optional constraint expression admits `version`.
pub fn satisfies(expr: Option<&str>, version: &Version) -> bool {
    expr.map_or(true, |e| VersionConstraint::parse(e).matches(version))
}

/// Whether a plugin built against `plugin_api` can run on a host implementing `host_api`.
///
/// The major versions must be equal and the plugin may not target a newer
/// minor than the host provides.
pub fn api_compatible(plugin_api: &Version, host_api: &Version) -> bool {
    plugin_api.major == host_api.major && plugin_api.minor <= host_api.minor
}

/// The host's own versions, against which manifests are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostVersions {
    pub host: Version,
    pub api: Version,
}

impl HostVersions {
    pub fn new(host: Version, api: Version) -> Self {
        Self { host, api }
    }

    /// The versions of this build.
    pub fn current() -> Self {
        Self {
            host: toolgate_core::host_version(),
            api: toolgate_core::api_version(),
        }
    }
}

/// Outcome of resolving a manifest against the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Admit,
    Reject(String),
}

impl Resolution {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Resolution::Admit)
    }
}

/// Resolve a manifest's version requirements against the host.
pub fn resolve(manifest: &PluginManifest, host: &HostVersions) -> Resolution {
    let plugin_api = match Version::parse(manifest.api_version.trim()) {
        Ok(v) => v,
        Err(e) => {
            return Resolution::Reject(format!(
                "apiVersion '{}' is not a semantic version: {e}",
                manifest.api_version
            ));
        }
    };

    if !api_compatible(&plugin_api, &host.api) {
        return Resolution::Reject(format!(
            "plugin targets API {plugin_api}, host implements API {}",
            host.api
        ));
    }

    if !satisfies(manifest.requires.host.as_deref(), &host.host) {
        return Resolution::Reject(format!(
            "requires host '{}', running host is {}",
            manifest.requires.host.as_deref().unwrap_or_default(),
            host.host
        ));
    }

    if !satisfies(manifest.requires.api.as_deref(), &host.api) {
        return Resolution::Reject(format!(
            "requires API '{}', host implements API {}",
            manifest.requires.api.as_deref().unwrap_or_default(),
            host.api
        ));
    }

    Resolution::Admit
}

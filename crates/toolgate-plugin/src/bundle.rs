// SPDX-FileCopyrightText: 2026 Toolgate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk plugin bundles.
//!
//! A bundle is either a directory or a gzip-compressed tarball (`.tar.gz` /
//! `.tgz`) with a `plugin.json` manifest at its root. Archives are read in
//! place; nothing is extracted.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use toolgate_core::ToolgateError;
use tracing::debug;

use crate::manifest::{parse_manifest, PluginManifest};

/// File name of the manifest inside every bundle.
pub const MANIFEST_FILE: &str = "plugin.json";

/// Upper bound on manifest size, so a hostile archive cannot exhaust memory.
const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

/// Packaging of a bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleKind {
    Directory,
    Archive,
}

/// A discovered plugin bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub path: PathBuf,
    pub kind: BundleKind,
}

impl Bundle {
    /// Classifies `path` as a bundle, or `None` if it cannot be one.
    pub fn from_path(path: &Path) -> Option<Self> {
        let kind = if path.is_dir() {
            BundleKind::Directory
        } else if path.is_file() && is_archive_name(path) {
            BundleKind::Archive
        } else {
            return None;
        };
        Some(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    /// The bundle's private data directory (directory bundles only).
    pub fn data_dir(&self) -> Option<&Path> {
        match self.kind {
            BundleKind::Directory => Some(&self.path),
            BundleKind::Archive => None,
        }
    }

    /// Reads the raw manifest text.
    pub fn read_manifest_text(&self) -> Result<String, ToolgateError> {
        match self.kind {
            BundleKind::Directory => read_directory_manifest(&self.path),
            BundleKind::Archive => read_archive_manifest(&self.path),
        }
    }

    /// Reads and parses the bundle's manifest.
    pub fn read_manifest(&self) -> Result<PluginManifest, ToolgateError> {
        parse_manifest(&self.read_manifest_text()?)
    }
}

fn is_archive_name(path: &Path) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    name.ends_with(".tar.gz") || name.ends_with(".tgz")
}

fn read_limited(reader: impl Read, origin: &Path) -> Result<String, ToolgateError> {
    let mut text = String::new();
    reader
        .take(MAX_MANIFEST_BYTES + 1)
        .read_to_string(&mut text)
        .map_err(|e| {
            ToolgateError::Manifest(format!("cannot read manifest in {}: {e}", origin.display()))
        })?;
    if text.len() as u64 > MAX_MANIFEST_BYTES {
        return Err(ToolgateError::Manifest(format!(
            "manifest in {} exceeds {MAX_MANIFEST_BYTES} bytes",
            origin.display()
        )));
    }
    Ok(text)
}

fn read_directory_manifest(dir: &Path) -> Result<String, ToolgateError> {
    let path = dir.join(MANIFEST_FILE);
    let file = File::open(&path).map_err(|e| {
        ToolgateError::Manifest(format!("no {MANIFEST_FILE} in {}: {e}", dir.display()))
    })?;
    read_limited(file, &path)
}

fn read_archive_manifest(archive_path: &Path) -> Result<String, ToolgateError> {
    let open_err =
        |e: std::io::Error| ToolgateError::Manifest(format!("cannot open {}: {e}", archive_path.display()));

    let file = File::open(archive_path).map_err(open_err)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    for entry in archive.entries().map_err(open_err)? {
        let entry = entry.map_err(open_err)?;
        let is_manifest = entry
            .path()
            .map(|p| is_root_manifest(&p))
            .unwrap_or(false);
        if is_manifest {
            return read_limited(entry, archive_path);
        }
    }

    Err(ToolgateError::Manifest(format!(
        "no {MANIFEST_FILE} at the root of {}",
        archive_path.display()
    )))
}

/// `plugin.json` or `./plugin.json`, but not `nested/plugin.json`.
fn is_root_manifest(path: &Path) -> bool {
    let mut normal = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    matches!(
        (normal.next(), normal.next()),
        (Some(Component::Normal(name)), None) if name == MANIFEST_FILE
    )
}

/// Lists the bundles in `dir`, sorted by file name.
///
/// Entries that are neither directories nor archives are ignored.
pub fn discover_bundles(dir: &Path) -> std::io::Result<Vec<Bundle>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();
    paths.sort();

    let mut bundles = Vec::new();
    for path in paths {
        match Bundle::from_path(&path) {
            Some(bundle) => bundles.push(bundle),
            None => debug!(path = %path.display(), "ignoring non-bundle entry"),
        }
    }
    Ok(bundles)
}

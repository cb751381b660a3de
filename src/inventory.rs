//! Layer inventory - read-only view of known layers.
//!
//! Lists subdirectories of the local layers root (provenance tag `local`)
//! and of the cache root (provenance = the git remote URL recorded in the
//! working copy). Performs no network access and mutates nothing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cache;
use crate::config::Settings;
use crate::process::Cmd;

/// Provenance tag for layers under the local layers root.
pub const LOCAL_SOURCE: &str = "local";

/// One known layer and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerEntry {
    pub name: String,
    /// `local`, a git remote URL, or empty if the remote can't be read.
    pub source: String,
}

/// Enumerate local and cached layers.
pub fn list(settings: &Settings) -> Result<Vec<LayerEntry>> {
    let mut entries = Vec::new();

    for dir in subdirs(&settings.layers_dir)? {
        entries.push(LayerEntry {
            name: dir_name(&dir),
            source: LOCAL_SOURCE.to_string(),
        });
    }

    for dir in subdirs(&settings.cache_dir)? {
        let source = origin_url(&dir);
        // A cached entry's display name comes from its recorded URL; the
        // directory name carries a hash suffix.
        let name = cache::layer_name(&source).unwrap_or_else(|_| dir_name(&dir));
        entries.push(LayerEntry { name, source });
    }

    Ok(entries)
}

/// Print the inventory as a two-column table.
pub fn print_table(entries: &[LayerEntry]) {
    println!("{:<20} {:<20}", "Layer Name", "Source");
    for entry in entries {
        println!("{:<20} {:<20}", entry.name, entry.source);
    }
}

/// Subdirectories of `root`, sorted. A missing root lists nothing.
fn subdirs(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut dirs = Vec::new();
    for item in
        fs::read_dir(root).with_context(|| format!("Failed to read {}", root.display()))?
    {
        let item = item?;
        if item.file_type()?.is_dir() {
            dirs.push(item.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Recorded origin URL of a working copy, or empty if unreadable.
fn origin_url(dir: &Path) -> String {
    let result = Cmd::new("git")
        .arg("-C")
        .arg_path(dir)
        .args(["config", "--get", "remote.origin.url"])
        .allow_fail()
        .run();

    match result {
        Ok(r) if r.success() => r.stdout_trimmed().to_string(),
        _ => String::new(),
    }
}

//! Layer cache - local working copies of remote layers.
//!
//! One subdirectory per distinct remote layer, created lazily and never
//! evicted. Entries are keyed by the full normalized URL, not just its last
//! path segment: the directory name is `<segment>-<hash>` where the hash is
//! the first 8 hex digits of SHA-256 over the normalized URL, so two distinct
//! repositories that happen to share a final path segment get distinct
//! entries.
//!
//! Mutation of an entry (clone/pull) must happen under its advisory lock so
//! concurrent builds touching the same layer don't interleave git operations
//! on one working copy.

use anyhow::{bail, Context, Result};
use fs2::FileExt;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Cache of remote layer working copies.
#[derive(Debug, Clone)]
pub struct LayerCache {
    root: PathBuf,
}

/// Exclusive lock on one cache entry.
///
/// The flock is released when the handle is dropped.
pub struct EntryLock {
    _file: File,
}

impl LayerCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the cache root if absent. Safe to call on every invocation.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory: {}", self.root.display()))
    }

    /// Directory that holds (or will hold) the working copy for `url`.
    pub fn entry_path(&self, url: &str) -> Result<PathBuf> {
        Ok(self.root.join(entry_name(url)?))
    }

    /// Take the exclusive lock for the entry of `url`, blocking until free.
    pub fn lock_entry(&self, url: &str) -> Result<EntryLock> {
        self.ensure()?;
        let lock_path = self.root.join(format!(".{}.lock", entry_name(url)?));
        let file = File::create(&lock_path)
            .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("Failed to lock cache entry for {}", url))?;
        Ok(EntryLock { _file: file })
    }
}

/// Display name of a remote layer: the final non-empty path segment of its URL.
pub fn layer_name(url: &str) -> Result<String> {
    let normalized = normalize_url(url);

    // Strip "<scheme>://<host>" or scp-style "user@host:" prefixes so a host
    // name never counts as a path segment. Plain filesystem paths pass
    // through unchanged.
    let path = if let Some((_, rest)) = normalized.split_once("://") {
        rest.split_once('/').map(|(_host, p)| p).unwrap_or("")
    } else if let Some((_, rest)) = normalized.split_once(':') {
        rest
    } else {
        normalized.as_str()
    };

    let name = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("");
    if name.is_empty() {
        bail!("Cannot derive a layer name from URL: {}", url);
    }
    Ok(name.to_string())
}

/// Cache directory name for `url`: `<segment>-<8 hex of SHA-256(url)>`.
fn entry_name(url: &str) -> Result<String> {
    let name = layer_name(url)?;
    let mut hasher = Sha256::new();
    hasher.update(normalize_url(url).as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    Ok(format!("{}-{}", name, &digest[..8]))
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

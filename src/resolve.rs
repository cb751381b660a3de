//! Layer source resolution - descriptor to on-disk directory.
//!
//! Local layers resolve to a subdirectory of the layers root and must exist.
//! Git layers resolve to a cache entry, cloned on first use and pulled on
//! every later use. A failed fetch aborts resolution; the build never
//! proceeds with a partially-resolved layer set.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::cache::{self, LayerCache};
use crate::config::Settings;
use crate::process::Cmd;
use crate::recipe::LayerDescriptor;

/// A layer descriptor bound to a concrete directory.
#[derive(Debug, Clone)]
pub struct ResolvedLayer {
    /// Name used to namespace this layer's files in the overlay.
    pub name: String,
    /// Directory holding the layer's contents.
    pub path: PathBuf,
}

/// Resolve one descriptor to a directory, fetching if necessary.
pub fn resolve(
    descriptor: &LayerDescriptor,
    settings: &Settings,
    cache: &LayerCache,
) -> Result<ResolvedLayer> {
    match descriptor {
        LayerDescriptor::Local { name } => {
            let path = settings.layers_dir.join(name);
            if !path.is_dir() {
                bail!(
                    "Local layer '{}' not found at {}",
                    name,
                    path.display()
                );
            }
            Ok(ResolvedLayer {
                name: name.clone(),
                path,
            })
        }
        LayerDescriptor::Git { url, branch_or_tag } => {
            let name = cache::layer_name(url)?;
            let path = fetch_remote(cache, url, Some(branch_or_tag))
                .with_context(|| format!("Failed to resolve remote layer '{}'", name))?;
            Ok(ResolvedLayer { name, path })
        }
    }
}

/// Clone-if-absent, pull-if-present for a remote layer.
///
/// Holds the cache entry's advisory lock for the duration of the git
/// operation. Returns the entry's working copy path.
pub fn fetch_remote(cache: &LayerCache, url: &str, reference: Option<&str>) -> Result<PathBuf> {
    let path = cache.entry_path(url)?;
    let _lock = cache.lock_entry(url)?;

    if path.exists() {
        refresh(&path, url)?;
    } else {
        clone(&path, url, reference)?;
    }
    Ok(path)
}

fn clone(path: &Path, url: &str, reference: Option<&str>) -> Result<()> {
    match reference {
        Some(r) => println!("  Cloning {} ({})...", url, r),
        None => println!("  Cloning {}...", url),
    }

    let mut cmd = Cmd::new("git").arg("clone");
    if let Some(r) = reference {
        cmd = cmd.arg("-b").arg(r);
    }
    cmd.arg(url)
        .arg_path(path)
        .error_msg(format!("git clone failed for {}", url))
        .run()?;
    Ok(())
}

fn refresh(path: &Path, url: &str) -> Result<()> {
    println!("  Refreshing {}...", url);

    Cmd::new("git")
        .arg("-C")
        .arg_path(path)
        .arg("pull")
        .error_msg(format!("git pull failed for {}", url))
        .run()?;
    Ok(())
}

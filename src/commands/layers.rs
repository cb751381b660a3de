//! Layers command - inventory listing and remote imports.

use anyhow::Result;

use crate::cache::{self, LayerCache};
use crate::config::Settings;
use crate::inventory;
use crate::resolve;

/// List known layers (local and cached) with their provenance.
pub fn cmd_layers_list(settings: &Settings) -> Result<()> {
    let entries = inventory::list(settings)?;
    inventory::print_table(&entries);
    Ok(())
}

/// Import (or refresh) a remote layer into the cache.
pub fn cmd_layers_import(git_url: &str, settings: &Settings) -> Result<()> {
    let name = cache::layer_name(git_url)?;
    let cache = LayerCache::new(&settings.cache_dir);
    let path = resolve::fetch_remote(&cache, git_url, None)?;
    println!("Imported layer '{}' at {}", name, path.display());
    Ok(())
}

//! Recipe loading and validation.
//!
//! A recipe is a TOML file with a top-level `layers` array. Each entry names
//! either a local layer (`name = "base"`) or a git-hosted layer
//! (`type = "git"`, `url = ...`, `branch_or_tag = ...`). Entries without a
//! `type` key are local. The array order is the order layers are applied.
//!
//! ```toml
//! [[layers]]
//! name = "base"
//!
//! [[layers]]
//! type = "git"
//! url = "https://example.com/layers/net-layer"
//! branch_or_tag = "main"
//! ```

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One entry of the recipe's `layers` array, validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerDescriptor {
    /// A layer under the local layers root.
    Local { name: String },
    /// A git-hosted layer, cloned into the cache.
    Git { url: String, branch_or_tag: String },
}

/// Parsed and validated build specification.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub layers: Vec<LayerDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RawRecipe {
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Debug, Deserialize)]
struct RawLayer {
    #[serde(rename = "type")]
    kind: Option<String>,
    name: Option<String>,
    url: Option<String>,
    branch_or_tag: Option<String>,
}

impl Recipe {
    /// Load and validate a recipe file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recipe file: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid recipe: {}", path.display()))
    }

    /// Parse and validate recipe TOML.
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawRecipe = toml::from_str(content).context("Failed to parse TOML")?;

        if raw.layers.is_empty() {
            bail!("Recipe declares no layers");
        }

        let mut layers = Vec::with_capacity(raw.layers.len());
        for (idx, layer) in raw.layers.into_iter().enumerate() {
            layers.push(validate_layer(layer).with_context(|| format!("layers[{}]", idx))?);
        }

        Ok(Self { layers })
    }
}

fn validate_layer(raw: RawLayer) -> Result<LayerDescriptor> {
    match raw.kind.as_deref() {
        Some("git") => {
            let url = match raw.url {
                Some(url) if !url.trim().is_empty() => url,
                _ => bail!("git layer is missing 'url'"),
            };
            let branch_or_tag = match raw.branch_or_tag {
                Some(r) if !r.trim().is_empty() => r,
                _ => bail!("git layer '{}' is missing 'branch_or_tag'", url),
            };
            Ok(LayerDescriptor::Git { url, branch_or_tag })
        }
        // Anything other than "git" (including no type at all) is local.
        _ => match raw.name {
            Some(name) if !name.trim().is_empty() => Ok(LayerDescriptor::Local { name }),
            _ => bail!("local layer is missing 'name'"),
        },
    }
}

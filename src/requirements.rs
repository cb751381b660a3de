//! Package requirement aggregation across layers.
//!
//! Each layer may carry newline-delimited requirement lists under
//! `package-lists/`, one file per ecosystem. The three file names are
//! symmetric: `rpm-requirements.txt`, `deb-requirements.txt`,
//! `pip-requirements.txt`.
//!
//! Aggregation is ordered concatenation in recipe order. Duplicates are kept:
//! a later layer asking for a package again is not filtered, and order is
//! preserved so the install commands the pipeline constructs are
//! reproducible. No version-constraint merging happens here.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Directory inside a layer that holds the requirement lists.
pub const PACKAGE_LISTS_DIR: &str = "package-lists";

/// Package ecosystems a layer can contribute to, in install order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ecosystem {
    Rpm,
    Deb,
    Pip,
}

impl Ecosystem {
    /// Fixed install order: RPM, then Debian, then Python.
    pub const ALL: [Ecosystem; 3] = [Ecosystem::Rpm, Ecosystem::Deb, Ecosystem::Pip];

    /// Requirement file name for this ecosystem.
    pub fn list_file(&self) -> &'static str {
        match self {
            Ecosystem::Rpm => "rpm-requirements.txt",
            Ecosystem::Deb => "deb-requirements.txt",
            Ecosystem::Pip => "pip-requirements.txt",
        }
    }
}

/// Ordered per-ecosystem requirement lists aggregated across layers.
#[derive(Debug, Clone, Default)]
pub struct RequirementSet {
    pub rpm: Vec<String>,
    pub deb: Vec<String>,
    pub pip: Vec<String>,
}

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one layer's requirement lists, preserving file line order.
    pub fn add_layer(&mut self, layer_dir: &Path) -> Result<()> {
        for eco in Ecosystem::ALL {
            let lines = collect(layer_dir, eco)?;
            self.get_mut(eco).extend(lines);
        }
        Ok(())
    }

    fn get_mut(&mut self, eco: Ecosystem) -> &mut Vec<String> {
        match eco {
            Ecosystem::Rpm => &mut self.rpm,
            Ecosystem::Deb => &mut self.deb,
            Ecosystem::Pip => &mut self.pip,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rpm.is_empty() && self.deb.is_empty() && self.pip.is_empty()
    }
}

/// Read one ecosystem's requirement file from a layer directory.
///
/// Lines are trimmed; blank lines and `#` comments are dropped. A missing
/// file (or missing `package-lists/` directory) yields an empty list, not an
/// error.
pub fn collect(layer_dir: &Path, eco: Ecosystem) -> Result<Vec<String>> {
    let path = layer_dir.join(PACKAGE_LISTS_DIR).join(eco.list_file());
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read requirement list: {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

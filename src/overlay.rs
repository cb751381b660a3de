//! Overlay packaging - one archive from all layers' config trees.
//!
//! Each resolved layer may carry a `configs/` directory. The packager bundles
//! every such tree into a single tar.gz, rooted at the layer's name so two
//! layers cannot collide inside the archive. Entries are appended in recipe
//! order and files within a layer are walked in sorted order, so the archive
//! is reproducible and extraction is last-write-wins: a later layer's file at
//! the same in-image path overwrites an earlier layer's.
//!
//! The archive is a transient build artifact. It lives in a private temp
//! directory under a fixed file name (so the in-image extract command is
//! deterministic) and is deleted when the handle is dropped.

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::resolve::ResolvedLayer;

/// Directory inside a layer that holds files to overlay onto the image.
pub const CONFIGS_DIR: &str = "configs";

/// File name of the overlay archive, on disk and inside the image.
pub const ARCHIVE_NAME: &str = "layers-overlay.tar.gz";

/// A packaged overlay, deleted on drop.
pub struct OverlayArchive {
    // Holds the temp directory open for the archive's lifetime.
    _dir: TempDir,
    path: PathBuf,
    packed_layers: usize,
}

impl OverlayArchive {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of layers that contributed a `configs/` tree.
    pub fn packed_layers(&self) -> usize {
        self.packed_layers
    }

    /// True if no layer contributed any configs.
    pub fn is_empty(&self) -> bool {
        self.packed_layers == 0
    }
}

/// Bundle every layer's `configs/` tree into one tar.gz, in recipe order.
///
/// Layers without a `configs/` directory are skipped with a diagnostic; they
/// still contribute requirements elsewhere.
pub fn package(layers: &[ResolvedLayer]) -> Result<OverlayArchive> {
    let dir = TempDir::new().context("Failed to create temp directory for overlay archive")?;
    let path = dir.path().join(ARCHIVE_NAME);

    let file = File::create(&path)
        .with_context(|| format!("Failed to create overlay archive: {}", path.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut archive = tar::Builder::new(encoder);
    // Store symlinks as symlinks, like the in-image extraction expects.
    archive.follow_symlinks(false);

    let mut packed_layers = 0;
    for layer in layers {
        let configs = layer.path.join(CONFIGS_DIR);
        if !configs.is_dir() {
            eprintln!(
                "  [WARN] Layer '{}' has no {}/ directory, nothing to overlay",
                layer.name, CONFIGS_DIR
            );
            continue;
        }

        append_layer(&mut archive, &layer.name, &configs)
            .with_context(|| format!("Failed to package layer '{}'", layer.name))?;
        packed_layers += 1;
    }

    let encoder = archive
        .into_inner()
        .context("Failed to finish overlay archive")?;
    encoder.finish().context("Failed to flush overlay archive")?;

    Ok(OverlayArchive {
        _dir: dir,
        path,
        packed_layers,
    })
}

/// Append one layer's config tree under an archive root named after the layer.
fn append_layer<W: std::io::Write>(
    archive: &mut tar::Builder<W>,
    layer_name: &str,
    configs: &Path,
) -> Result<()> {
    // Sorted walk keeps archive bytes stable across runs.
    for entry in WalkDir::new(configs).sort_by_file_name() {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(configs)
            .expect("walkdir entry outside its root");
        let arc_path = Path::new(layer_name).join(rel);

        if entry.file_type().is_dir() {
            archive.append_dir(&arc_path, entry.path())?;
        } else {
            archive.append_path_with_name(entry.path(), &arc_path)?;
        }
    }
    Ok(())
}

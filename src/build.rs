//! Image build pipeline.
//!
//! Linear state machine: validate inputs, resolve layers (aggregating
//! requirements as each resolves), package the overlay, inject it into the
//! base image, install requirements per ecosystem, copy the mutated base
//! image to the output path. Steps run strictly in that order; the first
//! failing step aborts the rest, so a half-applied image is never presented
//! as a finished output.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;

use crate::cache::LayerCache;
use crate::config::Settings;
use crate::image::Customizer;
use crate::overlay::{self, ARCHIVE_NAME};
use crate::recipe::Recipe;
use crate::requirements::RequirementSet;
use crate::resolve::{self, ResolvedLayer};

/// In-image path of the python virtual environment.
pub const VENV_PATH: &str = "/opt/os-python-venv";

/// One in-image command the install phase will issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallCommand {
    /// Step label used in diagnostics and error messages.
    pub step: String,
    /// Command line passed to the customization tool's run-command.
    pub command: String,
}

/// Apply a recipe's layers to `base_image`, materializing `output_image`.
pub fn run(
    base_image: &Path,
    recipe_path: &Path,
    output_image: &Path,
    settings: &Settings,
) -> Result<()> {
    // Fail fast on bad inputs, before any external tool runs.
    validate_base_image(base_image)?;
    let recipe = Recipe::load(recipe_path)?;

    println!("=== Composing image ===");
    println!("  Base:   {}", base_image.display());
    println!("  Recipe: {} ({} layers)", recipe_path.display(), recipe.layers.len());

    // Resolve layers and aggregate requirements in recipe order.
    println!("\nResolving layers...");
    let cache = LayerCache::new(&settings.cache_dir);
    let mut layers: Vec<ResolvedLayer> = Vec::with_capacity(recipe.layers.len());
    let mut requirements = RequirementSet::new();

    for descriptor in &recipe.layers {
        let layer = resolve::resolve(descriptor, settings, &cache)?;
        requirements
            .add_layer(&layer.path)
            .with_context(|| format!("Failed to read requirements of layer '{}'", layer.name))?;
        println!("  Resolved '{}' -> {}", layer.name, layer.path.display());
        layers.push(layer);
    }

    // Package config trees into the overlay archive.
    println!("\nPackaging overlay...");
    let archive = overlay::package(&layers)?;

    let customizer = Customizer::new(base_image);

    // Inject the overlay: upload into the image root, then extract in place.
    if archive.is_empty() {
        println!("  [SKIP] No layer contributed configs, skipping overlay injection");
    } else {
        println!("\nInjecting overlay ({} layer(s))...", archive.packed_layers());
        customizer.upload(archive.path(), "/", "Overlay upload")?;
        customizer.run_command(
            &format!("tar xzf /{} -C /", ARCHIVE_NAME),
            "Overlay extraction",
        )?;
    }

    // Install aggregated requirements, ecosystem order fixed.
    let commands = install_commands(&requirements, &settings.python);
    if commands.is_empty() {
        println!("\n[SKIP] No package requirements to install");
    } else {
        println!("\nInstalling requirements...");
        for cmd in &commands {
            println!("  {}", cmd.step);
            customizer.run_command(&cmd.command, &cmd.step)?;
        }
    }

    // Materialize the output. The tool mutated the base image in place.
    println!("\nFinalizing...");
    fs::copy(base_image, output_image).with_context(|| {
        format!(
            "Failed to copy image to output path: {}",
            output_image.display()
        )
    })?;

    println!("\n=== Image complete ===");
    println!("  Output: {}", output_image.display());
    Ok(())
}

/// Check the base image exists and looks like a qcow2 file.
pub fn validate_base_image(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Base image not found: {}", path.display());
    }
    if path.extension().and_then(|e| e.to_str()) != Some("qcow2") {
        bail!("Base image is not a .qcow2 file: {}", path.display());
    }
    Ok(())
}

/// Build the ordered list of in-image install commands.
///
/// Ecosystem order is fixed regardless of recipe content: RPM, then Debian,
/// then Python. Empty ecosystems issue no commands. Python takes three:
/// create the venv, install into it, relax its permissions.
pub fn install_commands(requirements: &RequirementSet, python: &str) -> Vec<InstallCommand> {
    let mut commands = Vec::new();

    if !requirements.rpm.is_empty() {
        commands.push(InstallCommand {
            step: "RPM install".to_string(),
            command: format!("dnf install -y {}", requirements.rpm.join(" ")),
        });
    }

    if !requirements.deb.is_empty() {
        commands.push(InstallCommand {
            step: "Debian install".to_string(),
            command: format!("apt-get install -y {}", requirements.deb.join(" ")),
        });
    }

    if !requirements.pip.is_empty() {
        commands.push(InstallCommand {
            step: "Python venv creation".to_string(),
            command: format!("{} -m venv {}", python, VENV_PATH),
        });
        commands.push(InstallCommand {
            step: "Python install".to_string(),
            command: format!(
                "source {}/bin/activate && pip install {}",
                VENV_PATH,
                requirements.pip.join(" ")
            ),
        });
        commands.push(InstallCommand {
            step: "Python venv permissions".to_string(),
            command: format!("chmod -R 777 {}", VENV_PATH),
        });
    }

    commands
}

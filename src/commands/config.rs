//! Config command - apply a recipe's layers to a base image.

use anyhow::Result;
use std::path::Path;

use crate::build;
use crate::config::Settings;

/// Execute the config command.
///
/// A `--python-version` flag overrides the configured interpreter.
pub fn cmd_config(
    base_image: &Path,
    recipe: &Path,
    output_image: &Path,
    python_version: Option<&str>,
    mut settings: Settings,
) -> Result<()> {
    if let Some(python) = python_version {
        settings.python = python.to_string();
    }
    build::run(base_image, recipe, output_image, &settings)
}

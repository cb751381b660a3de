//! stratify - compose qcow2 VM images from ordered, reusable layers.
//!
//! A recipe names local and git-hosted layers; each contributes config files
//! and package-requirement lists. The layers are merged into one overlay and
//! applied to a base image via virt-customize.
#![allow(dead_code)]

mod build;
mod cache;
mod commands;
mod config;
mod image;
mod inventory;
mod overlay;
mod preflight;
mod process;
mod recipe;
mod requirements;
mod resolve;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::Settings;

#[derive(Parser)]
#[command(name = "stratify")]
#[command(about = "Compose qcow2 VM images from reusable configuration layers")]
#[command(
    after_help = "QUICK START:\n  stratify layers list                          Show known layers\n  stratify layers import <git-url>              Cache a remote layer\n  stratify config base.qcow2 recipe.toml out.qcow2   Build an image"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a recipe's layers to a base image
    Config {
        /// Path to the base qcow2 image
        base_image: PathBuf,
        /// Path to the recipe TOML file
        recipe: PathBuf,
        /// Path to save the output image
        output_image: PathBuf,
        /// Python interpreter for the in-image virtual environment
        #[arg(long)]
        python_version: Option<String>,
    },

    /// Inspect and manage layers
    Layers {
        #[command(subcommand)]
        command: LayersCommand,
    },
}

#[derive(Subcommand)]
enum LayersCommand {
    /// List local and cached layers with their provenance
    List,
    /// Clone (or refresh) a remote layer into the cache
    Import {
        /// Git URL to import
        git_url: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env if present
    dotenvy::dotenv().ok();
    let settings = Settings::load()?;

    preflight::warn_missing(&preflight::check_host_tools());

    match cli.command {
        Commands::Config {
            base_image,
            recipe,
            output_image,
            python_version,
        } => {
            commands::cmd_config(
                &base_image,
                &recipe,
                &output_image,
                python_version.as_deref(),
                settings,
            )?;
        }

        Commands::Layers { command } => match command {
            LayersCommand::List => commands::cmd_layers_list(&settings)?,
            LayersCommand::Import { git_url } => {
                commands::cmd_layers_import(&git_url, &settings)?
            }
        },
    }

    Ok(())
}

//! Configuration for stratify.
//!
//! Reads settings from environment variables, with `.env` support via
//! dotenvy (loaded in main). Every path the builder mutates under is held
//! here and passed down explicitly, so tests can point the cache and the
//! layers root at isolated temporary directories.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Default interpreter used to create the in-image virtual environment.
pub const DEFAULT_PYTHON: &str = "python3";

/// Directory name under the user cache dir that holds remote layer clones.
const CACHE_SUBDIR: &str = "stratify";

/// Resolved settings for one invocation.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root directory of local layers (default: `layers/` in the working dir).
    pub layers_dir: PathBuf,
    /// Root directory of the remote layer cache.
    pub cache_dir: PathBuf,
    /// Python interpreter for the in-image venv.
    pub python: String,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Recognized variables:
    /// - `STRATIFY_LAYERS_DIR` - local layers root
    /// - `STRATIFY_CACHE_DIR`  - remote layer cache root
    /// - `STRATIFY_PYTHON`     - default python interpreter
    pub fn load() -> Result<Self> {
        let layers_dir = env::var("STRATIFY_LAYERS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("layers"));

        let cache_dir = match env::var("STRATIFY_CACHE_DIR") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::cache_dir()
                .context("Could not determine the user cache directory")?
                .join(CACHE_SUBDIR),
        };

        let python = env::var("STRATIFY_PYTHON").unwrap_or_else(|_| DEFAULT_PYTHON.to_string());

        Ok(Self {
            layers_dir,
            cache_dir,
            python,
        })
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  Layers dir: {}", self.layers_dir.display());
        println!("  Cache dir:  {}", self.cache_dir.display());
        println!("  Python:     {}", self.python);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn env_overrides_take_effect() {
        env::set_var("STRATIFY_LAYERS_DIR", "/tmp/my-layers");
        env::set_var("STRATIFY_CACHE_DIR", "/tmp/my-cache");
        env::set_var("STRATIFY_PYTHON", "python3.12");

        let settings = Settings::load().unwrap();
        assert_eq!(settings.layers_dir, PathBuf::from("/tmp/my-layers"));
        assert_eq!(settings.cache_dir, PathBuf::from("/tmp/my-cache"));
        assert_eq!(settings.python, "python3.12");

        env::remove_var("STRATIFY_LAYERS_DIR");
        env::remove_var("STRATIFY_CACHE_DIR");
        env::remove_var("STRATIFY_PYTHON");
    }

    #[test]
    #[serial]
    fn defaults_without_env() {
        env::remove_var("STRATIFY_LAYERS_DIR");
        env::remove_var("STRATIFY_CACHE_DIR");
        env::remove_var("STRATIFY_PYTHON");

        let settings = Settings::load().unwrap();
        assert_eq!(settings.layers_dir, PathBuf::from("layers"));
        assert!(settings.cache_dir.ends_with(CACHE_SUBDIR));
        assert_eq!(settings.python, DEFAULT_PYTHON);
    }
}

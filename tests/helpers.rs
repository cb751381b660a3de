//! Shared test utilities for stratify tests.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use stratify::config::Settings;
use stratify::process::Cmd;

/// Test environment with isolated layers and cache roots.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Settings pointing every root inside the temp directory
    pub settings: Settings,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let settings = Settings {
            layers_dir: root.join("layers"),
            cache_dir: root.join("cache"),
            python: "python3".to_string(),
        };
        fs::create_dir_all(&settings.layers_dir).expect("Failed to create layers dir");

        Self {
            _temp_dir: temp_dir,
            settings,
        }
    }

    pub fn root(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Create an empty local layer directory.
    pub fn add_local_layer(&self, name: &str) -> PathBuf {
        let path = self.settings.layers_dir.join(name);
        fs::create_dir_all(&path).expect("Failed to create layer dir");
        path
    }
}

/// Write a file (and its parent directories) inside a layer.
pub fn write_layer_file(layer: &Path, rel: &str, content: &str) {
    let path = layer.join(rel);
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dirs");
    fs::write(path, content).expect("Failed to write layer file");
}

/// Turn a directory into a git repository with one commit on `main`.
///
/// The repository can then serve as a clone source via its filesystem path.
pub fn init_git_source(dir: &Path) {
    git(dir, &["init", "-q", "-b", "main"]);
    commit_all(dir, "initial layer contents");
}

/// Stage and commit everything in a git source repository.
pub fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(
        dir,
        &[
            "-c",
            "user.name=stratify-tests",
            "-c",
            "user.email=tests@example.com",
            "commit",
            "-q",
            "-m",
            message,
        ],
    );
}

fn git(dir: &Path, args: &[&str]) {
    Cmd::new("git")
        .arg("-C")
        .arg_path(dir)
        .args(args.iter().copied())
        .run()
        .expect("git command failed in test setup");
}

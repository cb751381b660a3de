//! virt-customize invocation wrapper.
//!
//! The image customization tool is a black box to us: we upload files into
//! the image and run commands inside it, one blocking invocation at a time.
//! The tool mutates the base image in place; materializing the output is the
//! pipeline's job, not this module's.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::process::Cmd;

/// External image customization tool.
pub const CUSTOMIZE_TOOL: &str = "virt-customize";

/// Handle on one image being customized.
#[derive(Debug, Clone)]
pub struct Customizer {
    image: PathBuf,
}

impl Customizer {
    pub fn new(image: &Path) -> Self {
        Self {
            image: image.to_path_buf(),
        }
    }

    pub fn image(&self) -> &Path {
        &self.image
    }

    /// Upload a host file into the image at `dest`.
    pub fn upload(&self, src: &Path, dest: &str, step: &str) -> Result<()> {
        self.cmd()
            .arg("--upload")
            .arg(format!("{}:{}", src.display(), dest))
            .error_msg(format!("{} failed", step))
            .run()?;
        Ok(())
    }

    /// Run a command inside the image.
    ///
    /// `command` is a single string because that is virt-customize's
    /// `--run-command` interface; it reaches the tool as one structured argv
    /// element, not through a host shell.
    pub fn run_command(&self, command: &str, step: &str) -> Result<()> {
        self.cmd()
            .arg("--run-command")
            .arg(command)
            .error_msg(format!("{} failed", step))
            .run()?;
        Ok(())
    }

    fn cmd(&self) -> Cmd {
        Cmd::new(CUSTOMIZE_TOOL).arg("-a").arg_path(&self.image)
    }
}

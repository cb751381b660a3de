//! Host tool availability checks.
//!
//! Missing tools are reported once at startup as warnings, not fatal: a
//! recipe with only local layers never needs git, and `layers list` never
//! needs virt-customize. The step that actually needs an absent tool still
//! fails with a clear error from the process module.

use std::path::PathBuf;

use crate::process;

/// Tools the builder may invoke, with package hints.
const HOST_TOOLS: [(&str, &str, &str); 2] = [
    (
        "virt-customize",
        "guestfs-tools",
        "Required to modify disk images",
    ),
    ("git", "git", "Required to fetch remote layers"),
];

/// Result of one tool lookup.
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub tool: &'static str,
    pub package: &'static str,
    pub purpose: &'static str,
    pub found: Option<PathBuf>,
}

/// Look up every host tool in PATH.
pub fn check_host_tools() -> Vec<ToolCheck> {
    HOST_TOOLS
        .iter()
        .map(|&(tool, package, purpose)| ToolCheck {
            tool,
            package,
            purpose,
            found: process::which(tool),
        })
        .collect()
}

/// Print a warning for each missing tool.
pub fn warn_missing(checks: &[ToolCheck]) {
    let missing: Vec<&ToolCheck> = checks.iter().filter(|c| c.found.is_none()).collect();
    if missing.is_empty() {
        return;
    }

    eprintln!("[WARN] Missing host tools:");
    for check in missing {
        eprintln!(
            "  - {}: not found. Install '{}' package. {}",
            check.tool, check.package, check.purpose
        );
    }
}

//! Opportunistic tool installation.
//!
//! Window commands may reference tools that are not installed. The composer
//! probes for the tool and, through an [`Installer`], attempts a best-effort
//! install before falling back to an informational shell window. The trait
//! exists so tests (and callers that want no side effects) can inject a no-op.

use colored::Colorize;

use crate::shell::{self, command_exists};

/// Capability interface for installing missing tools.
pub trait Installer {
    /// Attempt to install a tool by name. Returns true if the tool is
    /// usable afterwards.
    fn try_install(&self, tool: &str) -> bool;
}

/// Installs tools through the platform package manager (brew/apt/dnf).
pub struct PackageInstaller;

/// Never installs anything. Used in tests and when installs are disabled.
pub struct NoInstall;

impl Installer for NoInstall {
    fn try_install(&self, _tool: &str) -> bool {
        false
    }
}

/// Detect the available package manager for this platform.
fn detect_package_manager() -> Option<&'static str> {
    if cfg!(target_os = "macos") {
        if command_exists("brew") {
            return Some("brew");
        }
    } else if cfg!(target_os = "linux") {
        if command_exists("apt") {
            return Some("apt");
        }
        if command_exists("dnf") {
            return Some("dnf");
        }
    }
    None
}

/// Map a tool name to its package name where they differ.
fn package_name(tool: &str) -> &str {
    match tool {
        "mc" => "midnight-commander",
        _ => tool,
    }
}

impl Installer for PackageInstaller {
    fn try_install(&self, tool: &str) -> bool {
        let Some(manager) = detect_package_manager() else {
            eprintln!(
                "{} No supported package manager found, install '{}' manually",
                "⚠".yellow(),
                tool
            );
            return false;
        };

        let package = package_name(tool);
        let result = match manager {
            "brew" => shell::run_streaming("brew", &["install", package]),
            // apt and dnf need root; without sudo there is nothing to try
            "apt" | "dnf" if !command_exists("sudo") => {
                eprintln!(
                    "{} sudo not available, run: {} install {}",
                    "⚠".yellow(),
                    manager,
                    package
                );
                return false;
            }
            "apt" => shell::run_streaming("sudo", &["apt", "install", "-y", package]),
            "dnf" => shell::run_streaming("sudo", &["dnf", "install", "-y", package]),
            _ => return false,
        };

        match result {
            Ok(()) => {
                eprintln!("{} {} {}", "✔".green(), "Installed".dimmed(), tool);
                command_exists(tool)
            }
            Err(e) => {
                eprintln!("{} Failed to install {}: {}", "✘".red(), tool, e);
                false
            }
        }
    }
}

/// One suggested install command for a tool, shown in the fallback window
/// when installation was not possible.
pub fn install_hint(tool: &str) -> String {
    let manager = detect_package_manager().unwrap_or("brew");
    let package = package_name(tool);
    match manager {
        "brew" => format!("brew install {}", package),
        other => format!("sudo {} install {}", other, package),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_install_never_installs() {
        assert!(!NoInstall.try_install("lazygit"));
    }

    #[test]
    fn test_install_hint_names_tool_package() {
        let hint = install_hint("lazygit");
        assert!(hint.contains("install lazygit"));

        let hint = install_hint("mc");
        assert!(hint.contains("midnight-commander"));
    }
}

//! Git operations for workspace setup.
//!
//! A fresh workspace is a git repository holding the configured repos as
//! submodules, checked out to main, with one initial commit.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::shell;

/// Check if a directory is a git repository (has a .git entry).
pub fn is_git_repo(path: &Path) -> bool {
    path.join(".git").exists()
}

/// Extract the repository name from an HTTPS or SSH URL, without `.git`.
pub fn repo_name_from_url(url: &str) -> String {
    // SSH form: git@host:org/repo.git
    let tail = if url.contains(':') && !url.starts_with("http://") && !url.starts_with("https://")
    {
        url.rsplit(':').next().unwrap_or(url)
    } else {
        url
    };

    let name = tail.rsplit('/').next().unwrap_or(tail);
    name.strip_suffix(".git").unwrap_or(name).to_string()
}

/// Initialize a git repository, creating the directory if needed.
/// No-op if the directory is already a repository.
pub fn init_repo(workdir: &Path) -> Result<()> {
    std::fs::create_dir_all(workdir)
        .with_context(|| format!("Failed to create {}", workdir.display()))?;

    if is_git_repo(workdir) {
        return Ok(());
    }

    println!(
        "{} git repository in {}",
        "Initializing".dimmed(),
        workdir.display()
    );
    shell::run("git", &["init"], Some(workdir))?;
    Ok(())
}

/// Add a repository as a submodule, skipping if its directory already exists.
pub fn add_submodule(workdir: &Path, url: &str) -> Result<()> {
    let name = repo_name_from_url(url);
    if workdir.join(&name).exists() {
        println!("{} submodule {} (already present)", "Skipping".dimmed(), name);
        return Ok(());
    }

    println!("{} submodule {}", "Adding".dimmed(), name);
    shell::run("git", &["submodule", "add", url], Some(workdir))?;
    Ok(())
}

/// Checkout every submodule to main and pull the latest changes.
pub fn checkout_submodules_to_main(workdir: &Path) -> Result<()> {
    println!("{} submodules to main", "Checking out".dimmed());
    shell::run(
        "git",
        &["submodule", "foreach", "git checkout main && git pull"],
        Some(workdir),
    )?;
    Ok(())
}

/// Stage everything and create a commit.
pub fn initial_commit(workdir: &Path, message: &str) -> Result<()> {
    shell::run("git", &["add", "."], Some(workdir))?;
    shell::run("git", &["commit", "-m", message], Some(workdir))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_name_from_url() {
        assert_eq!(repo_name_from_url("https://github.com/org/repo.git"), "repo");
        assert_eq!(repo_name_from_url("https://github.com/org/repo"), "repo");
        assert_eq!(repo_name_from_url("git@github.com:org/repo.git"), "repo");
        assert_eq!(repo_name_from_url("repo"), "repo");
    }
}

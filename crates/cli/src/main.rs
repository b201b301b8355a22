//! Berth CLI - tmux workspace session launcher.
//!
//! Berth binds a workspace directory to a tmux session of the same name and
//! manages that session's lifecycle. A launch composes the session from the
//! configured windows (driver in `main`, auxiliary tools alongside), then
//! replaces this process with the tmux client.
//!
//! # Workflow
//!
//! 1. User runs `berth <workdir>`
//! 2. Config is loaded from `~/.berth.yaml` (or `-c <file>`)
//! 3. The workspace is scaffolded on first use (git repo, NOTES.md)
//! 4. The session is created if absent, each window booting from a
//!    generated rc-file, and the terminal is handed to tmux
//!
//! Flags select the other intents: `-k` kills the session, `--fresh`
//! recreates it, `-d` destroys the session and the workspace directory.
//!
//! Core functionality (config, rc-files, tmux lifecycle) is in `berth-core`.

mod cli;

use std::path::{Path, PathBuf};

use anyhow::Result;
use berth_core::{
    Intent, PackageInstaller, Tmux, WorkspaceSessionManager, ensure_required_tools, load_config,
    setup_workspace,
};
use clap::Parser;
use cli::Cli;
use colored::Colorize;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let workdir = resolve_workdir(&cli.workdir);
    let config = load_config(cli.config.as_deref())?;
    let dev = &config.dev;

    let mux = Tmux;
    let installer = PackageInstaller;
    let manager = WorkspaceSessionManager::new(&mux, &installer, dev);

    let prompt = cli.prompt.as_deref();
    let extra = cli.extra.as_deref();

    match cli.intent() {
        Intent::Destroy => {
            if !cli.yes && !confirm_destroy(&workdir)? {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            manager.destroy(&workdir)
        }
        Intent::Kill => manager.kill(&workdir),
        intent => {
            let use_tmux = dev.use_tmux && !cli.no_tmux;
            ensure_required_tools(dev, use_tmux)?;
            setup_workspace(&workdir, dev)?;

            if !use_tmux {
                return manager
                    .run_direct(&workdir, prompt, extra)
                    .map(|never| match never {});
            }

            manager.execute(intent, &workdir, prompt, extra)
        }
    }
}

/// Make the workspace path absolute. The directory may not exist yet
/// (a run intent creates it), so canonicalization is best-effort.
fn resolve_workdir(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    absolute.canonicalize().unwrap_or(absolute)
}

fn confirm_destroy(workdir: &Path) -> Result<bool> {
    use dialoguer::{Confirm, theme::ColorfulTheme};

    let confirmed = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "Delete {} and kill its session?",
            workdir.display()
        ))
        .default(false)
        .interact()?;

    Ok(confirmed)
}

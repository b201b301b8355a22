//! Session registry: existence checks, kills, and persistence purge.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use super::Multiplexer;

/// Queries and controls named sessions on a multiplexer.
pub struct SessionRegistry<'m> {
    mux: &'m dyn Multiplexer,
}

impl<'m> SessionRegistry<'m> {
    pub fn new(mux: &'m dyn Multiplexer) -> Self {
        Self { mux }
    }

    /// True iff the multiplexer reports a session with this exact name.
    /// A failed probe (multiplexer missing, misbehaving) counts as absent.
    pub fn exists(&self, name: &str) -> bool {
        self.mux.has_session(name).unwrap_or(false)
    }

    /// Kill a session if it exists; no-op otherwise. With `purge`, also
    /// delete any saved session-restore snapshots so an auto-restore plugin
    /// cannot resurrect what was just killed.
    pub fn kill(&self, name: &str, purge: bool) -> Result<()> {
        if self.exists(name) {
            self.mux.kill_session(name)?;
        }

        if purge && let Some(dir) = resurrect_dir() {
            purge_restore_state(&dir);
        }

        Ok(())
    }

    /// Issue an unconditional kill immediately before creating a session.
    ///
    /// The multiplexer's auto-restore automation can create a session with
    /// this name between an existence check and the create call, so the
    /// create path never trusts a prior "does not exist" answer. The kill
    /// failing (usually: no such session) is the normal case.
    pub fn prepare_create(&self, name: &str) {
        let _ = self.mux.kill_session(name);
    }
}

/// Where tmux-resurrect keeps its snapshots.
fn resurrect_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".tmux").join("resurrect"))
}

/// Remove the "last" pointer and all dated snapshot files from a restore
/// state directory. Individual delete failures are warned about, never fatal.
fn purge_restore_state(dir: &Path) {
    if !dir.exists() {
        return;
    }

    let last = dir.join("last");
    // "last" is usually a symlink; remove it even when its target is gone
    if last.symlink_metadata().is_ok()
        && let Err(e) = std::fs::remove_file(&last)
    {
        eprintln!("{} Failed to remove {}: {}", "⚠".yellow(), last.display(), e);
    }

    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "txt")
            && let Err(e) = std::fs::remove_file(&path)
        {
            eprintln!("{} Failed to remove {}: {}", "⚠".yellow(), path.display(), e);
        }
    }
}

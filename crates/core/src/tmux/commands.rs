//! The real tmux backend.

use std::{
    convert::Infallible,
    path::Path,
    process::{Command, Stdio},
};

use anyhow::{Context, Result};

use super::{Multiplexer, SplitDirection};

/// Execute a tmux command, returning an error if it fails.
fn tmux_run(args: &[&str]) -> Result<()> {
    let status = Command::new("tmux")
        .args(args)
        .status()
        .context("Failed to execute tmux command")?;
    if !status.success() {
        anyhow::bail!("tmux command failed: {:?}", args);
    }
    Ok(())
}

/// Execute a tmux command and check if it succeeded (suppressing stderr).
fn tmux_status(args: &[&str]) -> Result<bool> {
    Ok(Command::new("tmux")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("Failed to execute tmux command")?
        .success())
}

/// Check if we're currently inside a tmux client.
pub fn in_tmux() -> bool {
    std::env::var_os("TMUX").is_some()
}

/// Tmux as the session backend.
pub struct Tmux;

impl Multiplexer for Tmux {
    fn has_session(&self, name: &str) -> Result<bool> {
        tmux_status(&["has-session", "-t", name])
    }

    fn kill_session(&self, name: &str) -> Result<()> {
        tmux_run(&["kill-session", "-t", name])
    }

    fn new_session(
        &self,
        name: &str,
        window: &str,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()> {
        let dir = workdir.to_string_lossy();
        tmux_run(&[
            "new-session",
            "-d",
            "-s",
            name,
            "-n",
            window,
            "-c",
            &dir,
            exec_command,
        ])
    }

    fn new_window(
        &self,
        session: &str,
        window: &str,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()> {
        let dir = workdir.to_string_lossy();
        tmux_run(&[
            "new-window",
            "-t",
            session,
            "-n",
            window,
            "-c",
            &dir,
            exec_command,
        ])
    }

    fn split_window(
        &self,
        session: &str,
        window: &str,
        direction: SplitDirection,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()> {
        let target = format!("{}:{}", session, window);
        let dir = workdir.to_string_lossy();
        let flag = match direction {
            SplitDirection::Horizontal => "-h",
            SplitDirection::Vertical => "-v",
        };
        tmux_run(&["split-window", flag, "-t", &target, "-c", &dir, exec_command])
    }

    fn select_window(&self, session: &str, window: &str) -> Result<()> {
        let target = format!("{}:{}", session, window);
        tmux_run(&["select-window", "-t", &target])
    }

    fn inside_client(&self) -> bool {
        in_tmux()
    }

    fn attach(&self, name: &str, switch: bool) -> Result<Infallible> {
        use std::os::unix::process::CommandExt;

        let verb = if switch { "switch-client" } else { "attach-session" };

        // exec only returns if replacing the process image failed
        let err = Command::new("tmux").args([verb, "-t", name]).exec();
        Err(anyhow::Error::from(err)
            .context(format!("Failed to exec tmux {} for session '{}'", verb, name)))
    }
}

//! Window composition.
//!
//! Materializes window specs into tmux windows, writing a bootstrap script
//! per window and execing into it. The window named "shell" is special: it
//! always gets a second pane split horizontally, both panes booting from the
//! same script in the same working directory.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::{Multiplexer, SplitDirection};
use crate::{
    config::WindowSpec,
    install::{Installer, install_hint},
    rcfile::{MAIN_WINDOW, RcFileGenerator, exec_rcfile},
    shell::command_exists,
};

/// Window name that carries the two-pane composition rule.
pub const SHELL_WINDOW: &str = "shell";

/// Builds windows (and panes) inside a target session.
pub struct WindowComposer<'a> {
    mux: &'a dyn Multiplexer,
    installer: &'a dyn Installer,
    rcfiles: &'a RcFileGenerator,
}

impl<'a> WindowComposer<'a> {
    pub fn new(
        mux: &'a dyn Multiplexer,
        installer: &'a dyn Installer,
        rcfiles: &'a RcFileGenerator,
    ) -> Self {
        Self {
            mux,
            installer,
            rcfiles,
        }
    }

    /// Create the session itself, detached, with the main window booting
    /// from the main rc-file.
    pub fn create_main_window(
        &self,
        session: &str,
        workdir: &Path,
        main_command: &str,
        prompt: &str,
    ) -> Result<()> {
        let rcfile = self.rcfiles.main_rcfile(workdir, main_command, prompt)?;
        self.mux
            .new_session(session, MAIN_WINDOW, workdir, &exec_rcfile(&rcfile))
    }

    /// Create one auxiliary window from its spec.
    pub fn create_window(&self, session: &str, spec: &WindowSpec, workdir: &Path) -> Result<()> {
        // "shell" windows get two peer panes sharing one rc-file
        if spec.name == SHELL_WINDOW {
            let rcfile = self.rcfiles.shell_rcfile(&spec.name, workdir)?;
            let exec = exec_rcfile(&rcfile);
            self.mux.new_window(session, &spec.name, workdir, &exec)?;
            return self.mux.split_window(
                session,
                &spec.name,
                SplitDirection::Horizontal,
                workdir,
                &exec,
            );
        }

        if let Some(tool) = leading_token(&spec.command)
            && !command_exists(tool)
            && !self.installer.try_install(tool)
        {
            // The window is still created so the session never has a dead
            // slot; it explains what is missing and drops into a shell.
            eprintln!(
                "{} Tool '{}' not available, creating fallback window '{}'",
                "⚠".yellow(),
                tool,
                spec.name
            );
            let rcfile =
                self.rcfiles
                    .missing_tool_rcfile(&spec.name, workdir, tool, &install_hint(tool))?;
            return self
                .mux
                .new_window(session, &spec.name, workdir, &exec_rcfile(&rcfile));
        }

        let rcfile = if spec.command.is_empty() {
            self.rcfiles.shell_rcfile(&spec.name, workdir)?
        } else {
            self.rcfiles.command_rcfile(&spec.name, workdir, &spec.command)?
        };
        self.mux
            .new_window(session, &spec.name, workdir, &exec_rcfile(&rcfile))
    }
}

/// The leading token of a command string: the tool it needs on PATH.
pub fn leading_token(command: &str) -> Option<&str> {
    command.split_whitespace().next()
}

//! Multiplexer session management.
//!
//! The control surface this crate needs from tmux is small and abstracted
//! behind the [`Multiplexer`] trait so the lifecycle logic can be exercised
//! against a recording fake in tests (and, in principle, a different backend).
//!
//! # Submodules
//!
//! - [`commands`]: the real tmux implementation plus client helpers
//! - [`registry`]: session existence/kill queries and persistence purge
//! - [`compose`]: window and pane composition from window specs

pub mod commands;
pub mod compose;
pub mod registry;

#[cfg(test)]
pub(crate) mod fake;

use std::{convert::Infallible, path::Path};

use anyhow::Result;

pub use commands::{Tmux, in_tmux};
pub use compose::WindowComposer;
pub use registry::SessionRegistry;

/// Pane split direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitDirection {
    Horizontal,
    Vertical,
}

/// The multiplexer operations consumed by the session lifecycle.
///
/// Every window-creating call takes an `exec_command` that the window's shell
/// process is replaced with; callers pass `exec bash --rcfile '<path>'`
/// rather than raw shell text.
pub trait Multiplexer {
    /// Probe whether a session with this exact name exists.
    ///
    /// Errors mean the probe itself failed (e.g. the multiplexer binary is
    /// missing); [`SessionRegistry::exists`] downgrades those to `false`.
    fn has_session(&self, name: &str) -> Result<bool>;

    /// Kill a session. Errors if the session does not exist.
    fn kill_session(&self, name: &str) -> Result<()>;

    /// Create a detached session with a single named window.
    fn new_session(
        &self,
        name: &str,
        window: &str,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()>;

    /// Create a named window in an existing session.
    fn new_window(
        &self,
        session: &str,
        window: &str,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()>;

    /// Split a window, creating a peer pane.
    fn split_window(
        &self,
        session: &str,
        window: &str,
        direction: SplitDirection,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()>;

    /// Select a window so it is focused when a client attaches.
    fn select_window(&self, session: &str, window: &str) -> Result<()>;

    /// Whether this process is already running inside a multiplexer client.
    fn inside_client(&self) -> bool;

    /// Hand the terminal over to the session, replacing this process.
    ///
    /// `switch` selects switch-client over attach-session (nesting clients is
    /// invalid). On success this never returns; the only value ever produced
    /// is an error.
    fn attach(&self, name: &str, switch: bool) -> Result<Infallible>;
}

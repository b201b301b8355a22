//! Recording multiplexer fake for tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashSet,
    convert::Infallible,
    path::{Path, PathBuf},
};

use anyhow::Result;

use super::{Multiplexer, SplitDirection};

/// One recorded multiplexer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    HasSession(String),
    Kill(String),
    NewSession {
        name: String,
        window: String,
        workdir: PathBuf,
        exec: String,
    },
    NewWindow {
        session: String,
        window: String,
        exec: String,
    },
    Split {
        session: String,
        window: String,
        exec: String,
    },
    SelectWindow {
        session: String,
        window: String,
    },
    Attach {
        name: String,
        switch: bool,
    },
}

/// Multiplexer that records every call instead of touching tmux.
///
/// `exists` controls what `has_session` reports; a kill flips it to false
/// and `new_session` to true, which is enough to model the lifecycle.
/// Window names in `fail_windows` make `new_window` fail, for testing
/// best-effort composition. `probe_override` makes `has_session` lie about
/// the real state, to simulate a session appearing between check and create.
/// `attach` records the call and returns an error (a fake cannot replace the
/// process image).
#[derive(Default)]
pub(crate) struct RecordingMux {
    pub exists: Cell<bool>,
    pub inside: bool,
    pub probe_override: Option<bool>,
    pub fail_windows: HashSet<String>,
    pub calls: RefCell<Vec<Call>>,
}

impl RecordingMux {
    pub fn with_session(exists: bool) -> Self {
        let mux = Self::default();
        mux.exists.set(exists);
        mux
    }

    /// Recorded calls of a given shape, for counting.
    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls.borrow().iter().filter(|c| matches(c)).count()
    }
}

impl Multiplexer for RecordingMux {
    fn has_session(&self, name: &str) -> Result<bool> {
        self.calls
            .borrow_mut()
            .push(Call::HasSession(name.to_string()));
        Ok(self.probe_override.unwrap_or_else(|| self.exists.get()))
    }

    fn kill_session(&self, name: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::Kill(name.to_string()));
        if !self.exists.get() {
            anyhow::bail!("can't find session: {}", name);
        }
        self.exists.set(false);
        Ok(())
    }

    fn new_session(
        &self,
        name: &str,
        window: &str,
        workdir: &Path,
        exec_command: &str,
    ) -> Result<()> {
        self.calls.borrow_mut().push(Call::NewSession {
            name: name.to_string(),
            window: window.to_string(),
            workdir: workdir.to_path_buf(),
            exec: exec_command.to_string(),
        });
        self.exists.set(true);
        Ok(())
    }

    fn new_window(
        &self,
        session: &str,
        window: &str,
        _workdir: &Path,
        exec_command: &str,
    ) -> Result<()> {
        self.calls.borrow_mut().push(Call::NewWindow {
            session: session.to_string(),
            window: window.to_string(),
            exec: exec_command.to_string(),
        });
        if self.fail_windows.contains(window) {
            anyhow::bail!("window creation failed: {}", window);
        }
        Ok(())
    }

    fn split_window(
        &self,
        session: &str,
        window: &str,
        _direction: SplitDirection,
        _workdir: &Path,
        exec_command: &str,
    ) -> Result<()> {
        self.calls.borrow_mut().push(Call::Split {
            session: session.to_string(),
            window: window.to_string(),
            exec: exec_command.to_string(),
        });
        Ok(())
    }

    fn select_window(&self, session: &str, window: &str) -> Result<()> {
        self.calls.borrow_mut().push(Call::SelectWindow {
            session: session.to_string(),
            window: window.to_string(),
        });
        Ok(())
    }

    fn inside_client(&self) -> bool {
        self.inside
    }

    fn attach(&self, name: &str, switch: bool) -> Result<Infallible> {
        self.calls.borrow_mut().push(Call::Attach {
            name: name.to_string(),
            switch,
        });
        anyhow::bail!("attach recorded")
    }
}

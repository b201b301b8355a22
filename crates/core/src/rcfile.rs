//! Bootstrap script ("rc-file") generation.
//!
//! Every window in a session execs `bash --rcfile <script>` instead of
//! receiving inline shell text, so tmux never has to parse nested quoting.
//! Scripts are single-use: written once under a pid-scoped temp directory,
//! read once when the window's shell starts, never shared across sessions.
//!
//! The main window's script also embeds the resume decision. Whether to start
//! a fresh driver run or resume a previous one can only be decided inside the
//! freshly spawned window (the launcher has already handed off control by
//! then), so the branch is emitted as shell text that probes the driver's own
//! session listing at startup.

use std::{
    cell::Cell,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

/// Name of the main window in every session.
pub const MAIN_WINDOW: &str = "main";

/// Bundle identifier passed to the driver's resume command.
pub const RESUME_BUNDLE: &str = "berth";

/// Quote a string for safe interpolation into sh text.
///
/// Wraps in single quotes, closing and reopening around embedded quotes
/// (the `'\''` idiom).
pub fn sh_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

/// Writes single-use bootstrap scripts for session windows.
pub struct RcFileGenerator {
    dir: PathBuf,
    // Monotonic per-generator counter so every window gets its own file,
    // including windows with duplicate names.
    seq: Cell<u32>,
}

impl RcFileGenerator {
    /// Create a generator backed by a pid-scoped temp directory, so
    /// concurrent launcher invocations never collide.
    pub fn new() -> Result<Self> {
        let dir = std::env::temp_dir().join(format!("berth-rcfiles-{}", std::process::id()));
        Self::in_dir(dir)
    }

    /// Create a generator backed by an explicit directory.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create rcfile directory {}", dir.display()))?;
        Ok(Self {
            dir,
            seq: Cell::new(0),
        })
    }

    /// Directory the scripts are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self, window: &str) -> PathBuf {
        let seq = self.seq.get();
        self.seq.set(seq + 1);
        // Window names come from user config; the path ends up inside a
        // single-quoted exec string, so anything unsafe for a file name or
        // that quoting becomes a dash.
        let safe: String = window
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        self.dir.join(format!("{:02}-{}.sh", seq, safe))
    }

    fn write(&self, window: &str, content: &str) -> Result<PathBuf> {
        let path = self.next_path(window);
        fs::write(&path, content)
            .with_context(|| format!("Failed to write rcfile {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))?;
        }

        Ok(path)
    }

    /// Script for the main window: profile, cd, terminal settle/flush, then
    /// the resume branch around the driver command.
    pub fn main_rcfile(&self, workdir: &Path, main_command: &str, prompt: &str) -> Result<PathBuf> {
        let mut content = preamble(workdir);

        // Some terminal emulators answer capability queries (DA1/DA2/XTVERSION)
        // asynchronously; give the responses time to arrive, then drop them so
        // they are not delivered to the driver as typed input.
        content.push_str("sleep 0.5\n");
        content.push_str("read -t 0.2 -n 10000 _discard 2>/dev/null || true\n");

        let Some(driver) = main_command.split_whitespace().next() else {
            // No driver configured: the window degrades to a plain shell.
            return self.write(MAIN_WINDOW, &content);
        };

        let plain = if prompt.is_empty() {
            main_command.to_string()
        } else {
            format!("{} {}", main_command, sh_quote(prompt))
        };

        // Resume decision, evaluated inside the window at shell start.
        // An unreadable or unrecognized listing falls back to a plain run.
        content.push_str(&format!(
            "_listing=\"$({} sessions 2>/dev/null || true)\"\n",
            driver
        ));
        content.push_str("if printf '%s' \"$_listing\" | grep -qi 'no sessions'; then\n");
        content.push_str(&format!("    {}\n", plain));
        content.push_str("elif printf '%s' \"$_listing\" | grep -qi 'session'; then\n");
        content.push_str(&format!("    {} resume --bundle {}\n", driver, RESUME_BUNDLE));
        content.push_str("else\n");
        content.push_str(&format!("    {}\n", plain));
        content.push_str("fi\n");

        self.write(MAIN_WINDOW, &content)
    }

    /// Script for a plain shell window (or pane): profile and cd only.
    pub fn shell_rcfile(&self, window: &str, workdir: &Path) -> Result<PathBuf> {
        self.write(window, &preamble(workdir))
    }

    /// Script for a command window: profile, cd, then the command verbatim.
    pub fn command_rcfile(&self, window: &str, workdir: &Path, command: &str) -> Result<PathBuf> {
        let mut content = preamble(workdir);
        content.push_str(command);
        content.push('\n');
        self.write(window, &content)
    }

    /// Script for a window whose tool could not be installed: print what is
    /// missing and how to get it, then drop into an interactive shell so the
    /// window is still usable.
    pub fn missing_tool_rcfile(
        &self,
        window: &str,
        workdir: &Path,
        tool: &str,
        hint: &str,
    ) -> Result<PathBuf> {
        let mut content = preamble(workdir);
        let message = format!("Tool '{}' not found. Install with: {}", tool, hint);
        content.push_str(&format!("echo {}\n", sh_quote(&message)));
        content.push_str("exec bash -i\n");
        self.write(window, &content)
    }
}

fn preamble(workdir: &Path) -> String {
    format!(
        "source ~/.bashrc 2>/dev/null\ncd {}\n",
        sh_quote(&workdir.to_string_lossy())
    )
}

/// The command a window execs to boot from a script.
pub fn exec_rcfile(path: &Path) -> String {
    format!("exec bash --rcfile '{}'", path.display())
}

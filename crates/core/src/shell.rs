//! External command execution.
//!
//! Thin wrappers around `std::process::Command` with a typed error for the
//! failure modes the rest of the crate cares about: binary missing from PATH,
//! non-zero exit, or spawn failure.

use std::{
    path::Path,
    process::{Command, Output},
};

use thiserror::Error;

/// Errors from running external commands.
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("command not found: {0}")]
    NotFound(String),

    #[error("required commands not found: {0}")]
    MissingTools(String),

    #[error("command failed with exit code {code}: {command}")]
    Failed { command: String, code: i32 },

    #[error("failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

fn spawn_error(program: &str, args: &[&str], err: std::io::Error) -> ShellError {
    let command = display_command(program, args);
    if err.kind() == std::io::ErrorKind::NotFound {
        ShellError::NotFound(program.to_string())
    } else {
        ShellError::Spawn {
            command,
            source: err,
        }
    }
}

fn display_command(program: &str, args: &[&str]) -> String {
    let mut parts = vec![program];
    parts.extend_from_slice(args);
    parts.join(" ")
}

/// Run a command, capturing output. Non-zero exit is an error.
pub fn run(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<Output, ShellError> {
    let mut cmd = Command::new(program);
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let output = cmd.output().map_err(|e| spawn_error(program, args, e))?;

    if !output.status.success() {
        return Err(ShellError::Failed {
            command: display_command(program, args),
            code: output.status.code().unwrap_or(-1),
        });
    }

    Ok(output)
}

/// Run a command with inherited stdio (for interactive installs).
/// Non-zero exit is an error.
pub fn run_streaming(program: &str, args: &[&str]) -> Result<(), ShellError> {
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|e| spawn_error(program, args, e))?;

    if !status.success() {
        return Err(ShellError::Failed {
            command: display_command(program, args),
            code: status.code().unwrap_or(-1),
        });
    }

    Ok(())
}

/// Check if a command is resolvable on the current PATH.
pub fn command_exists(name: &str) -> bool {
    // Absolute or relative paths are checked directly
    if name.contains('/') {
        return is_executable(Path::new(name));
    }

    let Some(path) = std::env::var_os("PATH") else {
        return false;
    };

    std::env::split_paths(&path).any(|dir| is_executable(&dir.join(name)))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Validate that all required commands exist on PATH.
pub fn ensure_commands(names: &[&str]) -> Result<(), ShellError> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|name| !command_exists(name))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShellError::MissingTools(missing.join(", ")))
    }
}

//! Configuration types and loading.
//!
//! Configuration lives in `~/.berth.yaml`. A missing file means defaults;
//! per-field defaults also apply to any keys the file leaves out, so partial
//! configs are fine.
//!
//! ```yaml
//! dev:
//!   use_tmux: true
//!   repos:
//!     - https://github.com/example/agent.git
//!   main_command: "amp run"
//!   default_prompt: ""
//!   notes_template: ""
//!   windows:
//!     shell: ""        # empty command = interactive shell only
//!     git: "lazygit"
//!     files: "mc"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Config file name, resolved relative to the home directory.
pub const CONFIG_FILE: &str = ".berth.yaml";

/// An ordered window entry: name plus the command to run in it.
///
/// An empty command means "interactive shell only". Names are not required
/// to be unique; duplicates simply produce multiple windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSpec {
    pub name: String,
    pub command: String,
}

/// Settings for the dev workspace launcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevConfig {
    /// Whether to launch inside tmux (false = exec the driver directly)
    pub use_tmux: bool,
    /// Repository URLs added as submodules during workspace setup
    pub repos: Vec<String>,
    /// Command run in the main window (first token is the driver binary)
    pub main_command: String,
    /// Prompt appended to the main command when no override is given
    pub default_prompt: String,
    /// Custom NOTES.md template path, empty = built-in scaffold
    pub notes_template: String,
    /// Auxiliary windows, in creation order (name -> command)
    pub windows: IndexMap<String, String>,
}

impl Default for DevConfig {
    fn default() -> Self {
        let mut windows = IndexMap::new();
        windows.insert("shell".to_string(), String::new());
        windows.insert("git".to_string(), "lazygit".to_string());
        windows.insert("files".to_string(), "mc".to_string());

        Self {
            use_tmux: true,
            repos: Vec::new(),
            main_command: "amp run".to_string(),
            default_prompt: String::new(),
            notes_template: String::new(),
            windows,
        }
    }
}

impl DevConfig {
    /// The configured windows as an ordered spec list.
    pub fn window_specs(&self) -> Vec<WindowSpec> {
        self.windows
            .iter()
            .map(|(name, command)| WindowSpec {
                name: name.clone(),
                command: command.clone(),
            })
            .collect()
    }

    /// The driver binary: leading token of the main command.
    pub fn driver(&self) -> Option<&str> {
        self.main_command.split_whitespace().next()
    }
}

/// Root configuration object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub dev: DevConfig,
}

/// Default config file location (`~/.berth.yaml`).
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_FILE)
}

/// Load configuration, falling back to defaults if the file is missing.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config {}", path.display()))
}

/// Persist configuration back to disk (user overrides survive restarts).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);

    let content = serde_yaml::to_string(config).context("Failed to serialize config")?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    Ok(())
}

//! Berth Core - Core library for the berth workspace launcher
//!
//! This crate provides the core functionality for berth including:
//! - Configuration loading and persistence
//! - Tmux session lifecycle and window composition
//! - Rc-file generation for window bootstrap
//! - Workspace setup (git scaffold, notes file)

pub mod config;
pub mod git;
pub mod install;
pub mod rcfile;
pub mod shell;
pub mod terminal;
pub mod tmux;
pub mod workspace;

// Re-export commonly used types at crate root
pub use config::{Config, DevConfig, WindowSpec, config_path, load_config, save_config};
pub use install::{Installer, NoInstall, PackageInstaller};
pub use rcfile::{MAIN_WINDOW, RESUME_BUNDLE, RcFileGenerator};
pub use tmux::{Multiplexer, SessionRegistry, Tmux, WindowComposer, in_tmux};
pub use workspace::{
    Intent, WorkspaceSessionManager, ensure_required_tools, final_prompt, session_name,
    setup_workspace,
};

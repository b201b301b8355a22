//! Workspace session lifecycle.
//!
//! The manager decides, per user intent, whether to create, resume, kill, or
//! destroy the session bound to a workspace directory, composes the windows,
//! and finally hands the terminal over to the multiplexer. Attach is a
//! terminal operation: on success the process image is replaced and nothing
//! after it runs.

use std::{
    convert::Infallible,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::{
    config::DevConfig,
    git,
    install::Installer,
    rcfile::{MAIN_WINDOW, RcFileGenerator, sh_quote},
    shell, terminal,
    tmux::{Multiplexer, SessionRegistry, WindowComposer},
};

/// Workspace notes scaffold file name.
const NOTES_FILE: &str = "NOTES.md";

/// How long the pre-attach stdin drain may take at most.
const FLUSH_TIMEOUT: Duration = Duration::from_millis(200);

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Create the session if needed, then attach.
    Run,
    /// Kill the session, leave the workspace alone.
    Kill,
    /// Kill the session (purging restore snapshots), then recreate and attach.
    Fresh,
    /// Kill the session and delete the workspace directory.
    Destroy,
}

/// Session name for a workspace: the directory's base name.
///
/// Pure function of the path, so repeated launches of the same workspace
/// always address the same session.
pub fn session_name(workdir: &Path) -> String {
    workdir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| workdir.to_string_lossy().to_string())
}

/// Final prompt: the override if given, else the configured default, with
/// any extra text appended on its own line.
pub fn final_prompt(config: &DevConfig, prompt: Option<&str>, extra: Option<&str>) -> String {
    let base = prompt.unwrap_or(&config.default_prompt);

    match extra {
        Some(extra) if !extra.is_empty() => {
            if base.is_empty() {
                extra.to_string()
            } else {
                format!("{}\n{}", base, extra)
            }
        }
        _ => base.to_string(),
    }
}

/// Verify the tools a launch needs are on PATH before touching anything.
pub fn ensure_required_tools(config: &DevConfig, use_tmux: bool) -> Result<()> {
    let mut required = vec!["git"];
    if use_tmux {
        required.push("tmux");
    }
    if let Some(driver) = config.driver() {
        required.push(driver);
    }
    shell::ensure_commands(&required)?;
    Ok(())
}

/// Initialize the workspace directory: git repo with configured submodules
/// and a notes scaffold. Idempotent.
pub fn setup_workspace(workdir: &Path, config: &DevConfig) -> Result<()> {
    if !git::is_git_repo(workdir) {
        println!(
            "{} new workspace: {}",
            "Setting up".dimmed(),
            workdir.display()
        );
        git::init_repo(workdir)?;
        for url in &config.repos {
            git::add_submodule(workdir, url)?;
        }
        if !config.repos.is_empty() {
            git::checkout_submodules_to_main(workdir)?;
            git::initial_commit(workdir, "Initial workspace setup")?;
        }
    }

    create_notes_file(workdir, config)
}

/// Create NOTES.md from the configured template, or a minimal scaffold.
/// Skips if the file already exists.
fn create_notes_file(workdir: &Path, config: &DevConfig) -> Result<()> {
    let path = workdir.join(NOTES_FILE);
    if path.exists() {
        return Ok(());
    }

    if !config.notes_template.is_empty() {
        let template = Path::new(&config.notes_template);
        if template.exists() {
            std::fs::copy(template, &path)
                .with_context(|| format!("Failed to copy template {}", template.display()))?;
            return Ok(());
        }
        eprintln!(
            "{} Notes template not found: {}",
            "⚠".yellow(),
            template.display()
        );
    }

    let scaffold = "# Workspace Notes\n\n\
                    Add project-specific notes and instructions here.\n";
    std::fs::write(&path, scaffold)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    Ok(())
}

/// Orchestrates the session state machine for one workspace.
pub struct WorkspaceSessionManager<'a> {
    mux: &'a dyn Multiplexer,
    installer: &'a dyn Installer,
    config: &'a DevConfig,
    rcfile_dir: Option<PathBuf>,
}

impl<'a> WorkspaceSessionManager<'a> {
    pub fn new(
        mux: &'a dyn Multiplexer,
        installer: &'a dyn Installer,
        config: &'a DevConfig,
    ) -> Self {
        Self {
            mux,
            installer,
            config,
            rcfile_dir: None,
        }
    }

    /// Override the rc-file directory (defaults to a pid-scoped temp dir).
    pub fn rcfile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.rcfile_dir = Some(dir.into());
        self
    }

    /// Dispatch an intent. `Run` and `Fresh` do not return on success
    /// (the process is replaced by the multiplexer client).
    pub fn execute(
        &self,
        intent: Intent,
        workdir: &Path,
        prompt: Option<&str>,
        extra: Option<&str>,
    ) -> Result<()> {
        match intent {
            Intent::Run => self.launch(workdir, prompt, extra).map(|n| match n {}),
            Intent::Fresh => self
                .launch_fresh(workdir, prompt, extra)
                .map(|n| match n {}),
            Intent::Kill => self.kill(workdir),
            Intent::Destroy => self.destroy(workdir),
        }
    }

    /// Run intent: attach to the existing session, or create it first.
    pub fn launch(
        &self,
        workdir: &Path,
        prompt: Option<&str>,
        extra: Option<&str>,
    ) -> Result<Infallible> {
        let name = session_name(workdir);
        let registry = SessionRegistry::new(self.mux);

        if registry.exists(&name) {
            println!(
                "{}",
                format!("Attaching to existing session: {}", name).blue()
            );
            // Focus the main window; an already-renamed window is not fatal
            let _ = self.mux.select_window(&name, MAIN_WINDOW);
        } else {
            let prompt = final_prompt(self.config, prompt, extra);
            self.create(&registry, &name, workdir, &prompt)?;
        }

        self.attach(&name)
    }

    /// Fresh intent: kill any existing session (purging restore snapshots so
    /// it stays dead), then create and attach.
    pub fn launch_fresh(
        &self,
        workdir: &Path,
        prompt: Option<&str>,
        extra: Option<&str>,
    ) -> Result<Infallible> {
        let name = session_name(workdir);
        let registry = SessionRegistry::new(self.mux);

        if registry.exists(&name) {
            registry.kill(&name, true)?;
            println!("{} {} {}", "✔".green(), "Killed session".dimmed(), name);
        }

        let prompt = final_prompt(self.config, prompt, extra);
        self.create(&registry, &name, workdir, &prompt)?;
        self.attach(&name)
    }

    /// Kill intent: kill the session if it exists.
    pub fn kill(&self, workdir: &Path) -> Result<()> {
        let name = session_name(workdir);
        let registry = SessionRegistry::new(self.mux);

        if !registry.exists(&name) {
            println!("{}", format!("No session to kill: {}", name).dimmed());
            return Ok(());
        }

        registry.kill(&name, false)?;
        println!("{} {} {}", "✔".green(), "Killed session".dimmed(), name);
        Ok(())
    }

    /// Destroy intent: kill the session, then delete the workspace
    /// directory. Confirmation is the caller's responsibility.
    pub fn destroy(&self, workdir: &Path) -> Result<()> {
        let name = session_name(workdir);
        let registry = SessionRegistry::new(self.mux);

        if registry.exists(&name) {
            registry.kill(&name, false)?;
            println!("{} {} {}", "✔".green(), "Killed session".dimmed(), name);
        }

        if workdir.exists() {
            std::fs::remove_dir_all(workdir)
                .with_context(|| format!("Failed to delete workspace {}", workdir.display()))?;
            println!(
                "{} {} {}",
                "✔".green(),
                "Destroyed workspace".dimmed(),
                workdir.display()
            );
        } else {
            println!(
                "{}",
                format!("Workspace directory does not exist: {}", workdir.display()).dimmed()
            );
        }

        Ok(())
    }

    /// Run the driver directly, without a multiplexer: cd into the workspace
    /// and replace this process with the main command.
    pub fn run_direct(
        &self,
        workdir: &Path,
        prompt: Option<&str>,
        extra: Option<&str>,
    ) -> Result<Infallible> {
        use std::os::unix::process::CommandExt;

        if self.config.main_command.is_empty() {
            anyhow::bail!("No main command configured");
        }

        std::env::set_current_dir(workdir)
            .with_context(|| format!("Failed to change to {}", workdir.display()))?;

        let prompt = final_prompt(self.config, prompt, extra);
        let command = if prompt.is_empty() {
            self.config.main_command.clone()
        } else {
            format!("{} {}", self.config.main_command, sh_quote(&prompt))
        };

        println!("{} {}", "Running".dimmed(), command);
        let err = std::process::Command::new("sh").arg("-c").arg(&command).exec();
        Err(anyhow::Error::from(err).context(format!("Failed to exec: {}", command)))
    }

    /// Create the session with the main window and all auxiliary windows.
    fn create(
        &self,
        registry: &SessionRegistry,
        name: &str,
        workdir: &Path,
        prompt: &str,
    ) -> Result<()> {
        println!("{} {} {}", "✔".green(), "Creating session".dimmed(), name);

        // The multiplexer's restore automation can resurrect this name
        // between our existence check and the create call.
        registry.prepare_create(name);

        let rcfiles = match &self.rcfile_dir {
            Some(dir) => RcFileGenerator::in_dir(dir.clone())?,
            None => RcFileGenerator::new()?,
        };
        let composer = WindowComposer::new(self.mux, self.installer, &rcfiles);

        composer.create_main_window(name, workdir, &self.config.main_command, prompt)?;

        // Auxiliary windows are best-effort: one failing must not stop
        // composition of the rest.
        for spec in self.config.window_specs() {
            if let Err(e) = composer.create_window(name, &spec, workdir) {
                eprintln!(
                    "{} Failed to create window '{}': {}",
                    "⚠".yellow(),
                    spec.name,
                    e
                );
            }
        }

        if let Err(e) = self.mux.select_window(name, MAIN_WINDOW) {
            eprintln!("{} Failed to select main window: {}", "⚠".yellow(), e);
        }

        Ok(())
    }

    /// Hand the terminal to the session. Never returns on success.
    fn attach(&self, name: &str) -> Result<Infallible> {
        // Drain any capability-query responses still queued on stdin so
        // they are not delivered to the attached shell as typed input.
        terminal::flush_pending_input(FLUSH_TIMEOUT);

        // Nesting multiplexer clients is invalid; from inside one, switch.
        self.mux.attach(name, self.mux.inside_client())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DevConfig,
        install::NoInstall,
        tmux::fake::{Call, RecordingMux},
    };

    fn test_config() -> DevConfig {
        let mut config = DevConfig::default();
        config.main_command = "driver run".to_string();
        config.default_prompt = String::new();
        config.windows.clear();
        config.windows.insert("shell".to_string(), String::new());
        // "sh" is always on PATH, standing in for a real tool
        config.windows.insert("git".to_string(), "sh".to_string());
        config
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("berth-ws-test-{}", tag));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_session_name_is_basename() {
        assert_eq!(session_name(Path::new("/home/user/my-workspace")), "my-workspace");
        assert_eq!(session_name(Path::new("/tmp/proj-a")), "proj-a");
        // Idempotent: same input, same name
        assert_eq!(
            session_name(Path::new("/tmp/proj-a")),
            session_name(Path::new("/tmp/proj-a"))
        );
    }

    #[test]
    fn test_final_prompt() {
        let mut config = DevConfig::default();
        config.default_prompt = "Hello".to_string();

        assert_eq!(final_prompt(&config, None, None), "Hello");
        assert_eq!(final_prompt(&config, Some("Override"), None), "Override");
        assert_eq!(final_prompt(&config, None, Some("World")), "Hello\nWorld");
        assert_eq!(final_prompt(&config, Some(""), Some("World")), "World");
    }

    #[test]
    fn test_launch_scenario_creates_everything_then_attaches() {
        let mux = RecordingMux::with_session(false);
        let config = test_config();
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config)
            .rcfile_dir(scratch_dir("scenario"));

        let err = manager
            .launch(Path::new("/tmp/proj-a"), Some("hello"), None)
            .unwrap_err();
        assert!(err.to_string().contains("attach recorded"));

        let calls = mux.calls.borrow();

        // Unconditional pre-create kill, even though the probe said absent
        let kill_pos = calls
            .iter()
            .position(|c| matches!(c, Call::Kill(n) if n == "proj-a"))
            .expect("pre-create kill");
        let session_pos = calls
            .iter()
            .position(|c| matches!(c, Call::NewSession { name, .. } if name == "proj-a"))
            .expect("new-session");
        assert!(kill_pos < session_pos);
        assert_eq!(mux.count(|c| matches!(c, Call::Kill(_))), 1);
        assert_eq!(mux.count(|c| matches!(c, Call::NewSession { .. })), 1);

        // Main window boots from a script whose plain branch runs the
        // driver with the computed prompt
        let Call::NewSession { window, exec, .. } = &calls[session_pos] else {
            unreachable!()
        };
        assert_eq!(window, "main");
        let rcfile_path = exec
            .strip_prefix("exec bash --rcfile '")
            .and_then(|s| s.strip_suffix('\''))
            .unwrap();
        let content = std::fs::read_to_string(rcfile_path).unwrap();
        assert!(content.contains("driver run 'hello'"));

        // Shell window has two panes, git window one
        assert_eq!(
            mux.count(|c| matches!(c, Call::NewWindow { window, .. } if window == "shell")),
            1
        );
        assert_eq!(
            mux.count(|c| matches!(c, Call::Split { window, .. } if window == "shell")),
            1
        );
        assert_eq!(
            mux.count(|c| matches!(c, Call::NewWindow { window, .. } if window == "git")),
            1
        );

        // Main window selected, then the process-replacing attach
        let select_pos = calls
            .iter()
            .position(|c| matches!(c, Call::SelectWindow { window, .. } if window == "main"))
            .expect("select-window");
        let attach_pos = calls
            .iter()
            .position(|c| matches!(c, Call::Attach { name, switch } if name == "proj-a" && !switch))
            .expect("attach");
        assert!(select_pos < attach_pos);
        assert_eq!(attach_pos, calls.len() - 1);
    }

    #[test]
    fn test_launch_existing_session_attaches_without_recomposition() {
        let mux = RecordingMux::with_session(true);
        let config = test_config();
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config)
            .rcfile_dir(scratch_dir("existing"));

        manager
            .launch(Path::new("/tmp/proj-a"), None, None)
            .unwrap_err();

        assert_eq!(mux.count(|c| matches!(c, Call::NewSession { .. })), 0);
        assert_eq!(mux.count(|c| matches!(c, Call::NewWindow { .. })), 0);
        assert_eq!(
            mux.count(|c| matches!(c, Call::SelectWindow { window, .. } if window == "main")),
            1
        );
        assert_eq!(
            mux.count(|c| matches!(c, Call::Attach { name, .. } if name == "proj-a")),
            1
        );
    }

    #[test]
    fn test_create_survives_resurrection_race() {
        // Probe reports absent while the session actually exists, as if the
        // restore daemon resurrected it between check and create.
        let mut mux = RecordingMux::with_session(true);
        mux.probe_override = Some(false);
        let config = test_config();
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config)
            .rcfile_dir(scratch_dir("race"));

        manager
            .launch(Path::new("/tmp/proj-a"), None, None)
            .unwrap_err();

        // Exactly one kill, then exactly one new-session
        let calls = mux.calls.borrow();
        assert_eq!(mux.count(|c| matches!(c, Call::Kill(_))), 1);
        assert_eq!(mux.count(|c| matches!(c, Call::NewSession { .. })), 1);
        let kill_pos = calls
            .iter()
            .position(|c| matches!(c, Call::Kill(_)))
            .unwrap();
        let session_pos = calls
            .iter()
            .position(|c| matches!(c, Call::NewSession { .. }))
            .unwrap();
        assert!(kill_pos < session_pos);
    }

    #[test]
    fn test_window_failure_does_not_stop_composition() {
        let mut mux = RecordingMux::with_session(false);
        mux.fail_windows.insert("git".to_string());
        let mut config = test_config();
        config.windows.insert("files".to_string(), "sh".to_string());
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config)
            .rcfile_dir(scratch_dir("besteffort"));

        manager
            .launch(Path::new("/tmp/proj-a"), None, None)
            .unwrap_err();

        // All three windows were attempted despite "git" failing
        assert_eq!(
            mux.count(|c| matches!(c, Call::NewWindow { window, .. } if window == "files")),
            1
        );
        assert_eq!(
            mux.count(|c| matches!(c, Call::Attach { .. })),
            1
        );
    }

    #[test]
    fn test_attach_switches_when_inside_client() {
        let mut mux = RecordingMux::with_session(true);
        mux.inside = true;
        let config = test_config();
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config);

        manager
            .launch(Path::new("/tmp/proj-a"), None, None)
            .unwrap_err();

        assert_eq!(
            mux.count(|c| matches!(c, Call::Attach { switch, .. } if *switch)),
            1
        );
    }

    #[test]
    fn test_kill_is_noop_without_session() {
        let mux = RecordingMux::with_session(false);
        let config = test_config();
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config);

        manager.kill(Path::new("/tmp/proj-a")).unwrap();
        assert_eq!(mux.count(|c| matches!(c, Call::Kill(_))), 0);
    }

    #[test]
    fn test_destroy_kills_and_deletes() {
        let workdir = scratch_dir("destroy");
        std::fs::create_dir_all(&workdir).unwrap();
        std::fs::write(workdir.join("file"), "x").unwrap();

        let mux = RecordingMux::with_session(true);
        let config = test_config();
        let manager = WorkspaceSessionManager::new(&mux, &NoInstall, &config);

        manager.destroy(&workdir).unwrap();

        assert_eq!(mux.count(|c| matches!(c, Call::Kill(_))), 1);
        assert!(!workdir.exists());
    }

    #[test]
    fn test_setup_workspace_creates_notes_scaffold() {
        let workdir = scratch_dir("setup");
        std::fs::create_dir_all(&workdir).unwrap();
        // Pretend the repo is already initialized so setup skips git
        std::fs::create_dir_all(workdir.join(".git")).unwrap();

        let config = DevConfig::default();
        setup_workspace(&workdir, &config).unwrap();

        let notes = std::fs::read_to_string(workdir.join("NOTES.md")).unwrap();
        assert!(notes.contains("Workspace Notes"));

        // Idempotent: a second run leaves the file alone
        std::fs::write(workdir.join("NOTES.md"), "custom").unwrap();
        setup_workspace(&workdir, &config).unwrap();
        assert_eq!(
            std::fs::read_to_string(workdir.join("NOTES.md")).unwrap(),
            "custom"
        );

        std::fs::remove_dir_all(&workdir).ok();
    }
}

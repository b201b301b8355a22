use std::path::PathBuf;

use berth_core::Intent;
use clap::Parser;

#[derive(Parser)]
#[command(name = "berth")]
#[command(about = "Tmux workspace session launcher for development workflows")]
#[command(version)]
pub struct Cli {
    /// Workspace directory; its base name becomes the session name
    #[arg(value_name = "WORKDIR")]
    pub workdir: PathBuf,

    /// Prompt for the main command (overrides the configured default)
    #[arg(short = 'p', long = "prompt", value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Extra text appended to the prompt on its own line
    #[arg(short = 'e', long = "extra", value_name = "TEXT")]
    pub extra: Option<String>,

    /// Config file to use (default: ~/.berth.yaml)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run the main command directly in this terminal, without tmux
    #[arg(long = "no-tmux")]
    pub no_tmux: bool,

    /// Kill the workspace session and exit
    #[arg(
        short = 'k',
        long = "kill",
        conflicts_with_all = ["fresh", "destroy"]
    )]
    pub kill: bool,

    /// Kill any existing session (purging restore snapshots), then recreate
    #[arg(long = "fresh", conflicts_with = "destroy")]
    pub fresh: bool,

    /// Kill the session and delete the workspace directory
    #[arg(short = 'd', long = "destroy")]
    pub destroy: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
}

impl Cli {
    /// Map the mutually exclusive flags to an intent.
    pub fn intent(&self) -> Intent {
        if self.destroy {
            Intent::Destroy
        } else if self.kill {
            Intent::Kill
        } else if self.fresh {
            Intent::Fresh
        } else {
            Intent::Run
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_mapping() {
        let cli = Cli::parse_from(["berth", "/tmp/proj"]);
        assert_eq!(cli.intent(), Intent::Run);

        let cli = Cli::parse_from(["berth", "/tmp/proj", "-k"]);
        assert_eq!(cli.intent(), Intent::Kill);

        let cli = Cli::parse_from(["berth", "/tmp/proj", "--fresh"]);
        assert_eq!(cli.intent(), Intent::Fresh);

        let cli = Cli::parse_from(["berth", "/tmp/proj", "-d", "-y"]);
        assert_eq!(cli.intent(), Intent::Destroy);
        assert!(cli.yes);
    }

    #[test]
    fn test_kill_and_destroy_conflict() {
        assert!(Cli::try_parse_from(["berth", "/tmp/proj", "-k", "-d"]).is_err());
    }

    #[test]
    fn test_prompt_and_extra() {
        let cli = Cli::parse_from(["berth", "/tmp/proj", "-p", "hello", "-e", "more"]);
        assert_eq!(cli.prompt.as_deref(), Some("hello"));
        assert_eq!(cli.extra.as_deref(), Some("more"));
    }
}

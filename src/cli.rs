use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "rentchat", about = "Tenant/owner messaging for rental listings (TUI)")]
pub struct Cli {
    /// Path to config file (default: <config dir>/rentchat/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Start TUI shell
    Run,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RunArgs {
    /// Act as this user instead of identity.user_id from config
    #[arg(long = "as", value_name = "USER", global = true)]
    pub as_user: Option<String>,

    /// Open the conversation with this participant on start
    #[arg(long = "with", value_name = "USER", global = true)]
    pub participant: Option<String>,

    /// Listing the conversation is about
    #[arg(long, value_name = "LISTING", global = true)]
    pub context: Option<String>,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn defaults_to_run_when_command_is_missing() {
        let cli = Cli::parse_from(["rentchat"]);

        assert!(matches!(cli.command_or_default(), Command::Run));
        assert!(cli.run.as_user.is_none());
        assert!(cli.run.participant.is_none());
    }

    #[test]
    fn parses_explicit_run_command() {
        let cli = Cli::parse_from(["rentchat", "run", "--config", "custom.toml"]);

        assert!(matches!(cli.command_or_default(), Command::Run));
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn parses_identity_and_navigation_target() {
        let cli = Cli::parse_from([
            "rentchat",
            "run",
            "--as",
            "tenant-1",
            "--with",
            "owner-7",
            "--context",
            "listing-42",
        ]);

        assert_eq!(cli.run.as_user.as_deref(), Some("tenant-1"));
        assert_eq!(cli.run.participant.as_deref(), Some("owner-7"));
        assert_eq!(cli.run.context.as_deref(), Some("listing-42"));
    }

    #[test]
    fn run_flags_work_without_the_subcommand() {
        let cli = Cli::parse_from(["rentchat", "--as", "owner-7"]);

        assert!(cli.command.is_none());
        assert_eq!(cli.run.as_user.as_deref(), Some("owner-7"));
    }
}

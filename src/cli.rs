use std::path::PathBuf;

use clap::Parser;

use crate::api::DEFAULT_API_URL;
use crate::cmd::Commands;

/// Terminal client for ClickUp tasks.
/// Without a subcommand, opens the interactive task browser.
#[derive(Parser)]
#[command(name = "clup", version, about = "Browse, create, edit and delete ClickUp tasks from the terminal")]
pub struct Cli {
    /// Env file holding CLICKUP_API_TOKEN and CLICKUP_TEAM_ID.
    /// Replaces ./.env and receives newly entered credentials.
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Base URL of the ClickUp API.
    #[arg(long, global = true, default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Log file path. Filter with CLUP_LOG (default: clup=info).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_and_subcommands() {
        let cli = Cli::parse_from(["clup"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.api_url, DEFAULT_API_URL);

        let cli = Cli::parse_from(["clup", "task", "--env-file", "creds.env"]);
        assert!(matches!(cli.command, Some(Commands::Task)));
        assert_eq!(cli.env_file, Some(PathBuf::from("creds.env")));

        let cli = Cli::parse_from(["clup", "completions", "zsh"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }
}

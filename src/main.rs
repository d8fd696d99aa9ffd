//! # clup - ClickUp in the terminal
//!
//! A keyboard-driven client for a ClickUp workspace: browse the tasks of a
//! space, read their comments, edit descriptions and statuses in a small
//! modal editor, delete tasks, and create new ones through a five-step wizard.
//!
//! ## Quick Start
//!
//! ```bash
//! # Browse tasks (asks for credentials on first run)
//! clup
//!
//! # Create a task
//! clup task
//!
//! # Pick any task with fzf, then view or edit it
//! clup list
//! ```
//!
//! Credentials are read from `CLICKUP_API_TOKEN` / `CLICKUP_TEAM_ID` in the
//! environment, `./.env`, or `~/.clup.env`, in that order. Logs go to
//! `<data dir>/clup/clup.log`.

use std::sync::Arc;

use clap::Parser;

pub mod api;
pub mod bridge;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod fields;
pub mod fuzzy;
pub mod logging;
pub mod task;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod editor;
    pub mod enums;
    pub mod input;
    pub mod picker;
    pub mod render;
    pub mod run;
    pub mod screen;
    pub mod utils;
}

use api::{ClickUpClient, TaskService};
use cli::Cli;
use cmd::*;
use config::CredentialStore;
use fuzzy::FuzzyFinder;
use tui::enums::StartMode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        cmd_completions(shell);
        return;
    }

    let _log_guard = match logging::init(cli.log_file.clone()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Logging disabled: {e}");
            None
        }
    };

    let store = CredentialStore::new(cli.env_file.clone());
    let service: Arc<dyn TaskService> = Arc::new(ClickUpClient::new(cli.api_url.clone()));

    match cli.command {
        None => cmd_ui(store, service, StartMode::Browse).await,
        Some(Commands::Task) => cmd_task(store, service).await,
        Some(Commands::List) => cmd_list(store, service, FuzzyFinder::default()).await,
        Some(Commands::Completions { shell }) => cmd_completions(shell),
    }
}

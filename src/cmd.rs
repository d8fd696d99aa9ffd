//! Command implementations for the CLI interface.
//!
//! Each handler loads what it needs, runs to completion, and reports
//! failures on stderr with exit status 1.

use std::io::{self, BufRead, Write};
use std::process;
use std::sync::Arc;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use tracing::info;

use crate::api::TaskService;
use crate::bridge::Bridge;
use crate::config::{CredentialStore, Credentials};
use crate::fuzzy::{parse_task_id, task_line, FuzzyFinder};
use crate::tui::app::App;
use crate::tui::enums::StartMode;
use crate::tui::run::run_tui;

#[derive(Subcommand)]
pub enum Commands {
    /// Pick any task in the team with fzf, then view or edit it.
    List,

    /// Start directly in the task creation wizard.
    Task,

    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// What to do with a task picked from the fuzzy finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    View,
    Edit,
}

impl ListAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "view" => Some(ListAction::View),
            "edit" => Some(ListAction::Edit),
            _ => None,
        }
    }
}

fn load_credentials(store: &CredentialStore) -> Credentials {
    match store.load() {
        Ok(creds) => creds,
        Err(e) => {
            eprintln!("Failed to load credentials: {e}");
            process::exit(1);
        }
    }
}

/// Run the TUI and turn an error-screen exit into exit status 1.
async fn run_session(app: App, bridge: Bridge) {
    match run_tui(app, bridge).await {
        Ok(None) => {}
        Ok(Some(message)) => {
            eprintln!("Error: {message}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("UI error: {e}");
            process::exit(1);
        }
    }
}

/// Launch the interactive UI.
pub async fn cmd_ui(store: CredentialStore, service: Arc<dyn TaskService>, start: StartMode) {
    let credentials = load_credentials(&store);
    info!(?start, has_credentials = credentials.is_complete(), "starting ui");
    let app = App::new(credentials, start);
    run_session(app, Bridge::new(service, store)).await;
}

/// Launch the UI straight into the task creation wizard.
pub async fn cmd_task(store: CredentialStore, service: Arc<dyn TaskService>) {
    cmd_ui(store, service, StartMode::CreateTask).await;
}

/// Pick a task from every task in the team and open it.
pub async fn cmd_list(store: CredentialStore, service: Arc<dyn TaskService>, finder: FuzzyFinder) {
    let credentials = load_credentials(&store);
    if !credentials.is_complete() {
        eprintln!("Missing credentials. Run clup once to enter them, or set CLICKUP_API_TOKEN and CLICKUP_TEAM_ID.");
        process::exit(1);
    }

    let tasks = match service
        .tasks(&credentials.api_token, &credentials.team_id, None)
        .await
    {
        Ok(tasks) => tasks,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let lines: Vec<String> = tasks.iter().map(task_line).collect();
    let choice = match finder.select(&lines) {
        Ok(Some(choice)) => choice,
        Ok(None) => return,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let Some(task) = parse_task_id(&choice).and_then(|id| tasks.iter().find(|t| t.id == id)) else {
        return;
    };
    println!("Selected: {}", task.name);

    print!("What do you want to do? (view/edit): ");
    let mut answer = String::new();
    let read = io::stdout()
        .flush()
        .and_then(|_| io::stdin().lock().read_line(&mut answer));
    if let Err(e) = read {
        eprintln!("Error: {e}");
        process::exit(1);
    }

    let Some(action) = ListAction::parse(&answer) else {
        eprintln!("Invalid action.");
        process::exit(1);
    };
    let app = App::open_task(credentials, task.clone(), action == ListAction::Edit);
    run_session(app, Bridge::new(service, store)).await;
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}

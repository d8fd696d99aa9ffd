//! Terminal setup and the async event loop.
//!
//! The loop owns the [`App`] and funnels three sources into it one event at
//! a time: terminal input, command outcomes, and a spinner tick. Commands
//! returned by a transition run on their own tokio tasks and report back
//! through an unbounded channel.

use std::io::{self, stdout, Stdout};
use std::time::Duration;

use crossterm::{
    cursor::Show,
    event::{Event as TermEvent, EventStream},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::bridge::{Bridge, Command, Outcome};
use crate::tui::app::App;
use crate::tui::enums::Event;

const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum RunError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Restores the terminal when dropped, on every exit path.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        stdout().execute(EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = stdout().execute(Show);
    }
}

/// Spawn every command except `Quit`. Returns `true` if `Quit` was among them.
fn dispatch(bridge: &Bridge, tx: &UnboundedSender<Outcome>, token: &str, commands: Vec<Command>) -> bool {
    let mut quit = false;
    for command in commands {
        if matches!(command, Command::Quit) {
            quit = true;
            continue;
        }
        let bridge = bridge.clone();
        let tx = tx.clone();
        let token = token.to_string();
        tokio::spawn(async move {
            let outcome = bridge.execute(command, &token).await;
            // The receiver is gone once the loop has exited.
            let _ = tx.send(outcome);
        });
    }
    quit
}

/// Run the interactive session until it quits.
///
/// Returns the error message when the session ended on the error screen.
pub async fn run_tui(mut app: App, bridge: Bridge) -> Result<Option<String>, RunError> {
    let guard = TerminalGuard::enter()?;
    let mut terminal: Terminal<CrosstermBackend<Stdout>> = Terminal::new(CrosstermBackend::new(stdout()))?;
    info!(screen = app.screen.name(), "session started");

    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut events = EventStream::new();
    let mut spinner = tokio::time::interval(SPINNER_INTERVAL);

    let size = terminal.size()?;
    app.apply(Event::Resize {
        width: size.width,
        height: size.height,
    });
    let mut quit = dispatch(&bridge, &tx, &app.credentials.api_token, app.init());

    while !quit {
        terminal.draw(|f| app.render(f))?;

        let event = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(TermEvent::Key(key))) => Event::Key(key),
                Some(Ok(TermEvent::Resize(width, height))) => Event::Resize { width, height },
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(RunError::Io(e)),
                None => break,
            },
            Some(outcome) = rx.recv() => Event::Result(outcome),
            _ = spinner.tick() => Event::Tick,
        };

        let commands = app.apply(event);
        quit = dispatch(&bridge, &tx, &app.credentials.api_token, commands);
    }

    drop(terminal);
    drop(guard);
    let error = app.error_message().map(str::to_string);
    debug!(had_error = error.is_some(), "session ended");
    Ok(error)
}

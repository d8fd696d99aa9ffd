//! Enumerations for TUI state management.

use crossterm::event::KeyEvent;

use crate::bridge::Outcome;

/// Single input to the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    Resize { width: u16, height: u16 },
    /// Spinner heartbeat.
    Tick,
    Result(Outcome),
}

/// Input mode of the task editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Normal,
    Insert,
    Command,
}

/// Buffer receiving keys while the editor is in insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditFocus {
    #[default]
    Description,
    Comment,
}

impl EditFocus {
    pub fn toggle(self) -> Self {
        match self {
            EditFocus::Description => EditFocus::Comment,
            EditFocus::Comment => EditFocus::Description,
        }
    }
}

/// What the session does after a space is picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StartMode {
    #[default]
    Browse,
    CreateTask,
}

//! Multi-line editing on top of `tui_textarea`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;
use tui_textarea::{CursorMove, Input, Key, TextArea};

/// Translate a terminal key into the editor's input type.
///
/// Built field by field so the editor does not depend on which crossterm
/// release the rest of the app uses.
pub fn to_input(key: &KeyEvent) -> Input {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Enter => Key::Enter,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Tab => Key::Tab,
        KeyCode::Delete => Key::Delete,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Esc => Key::Esc,
        KeyCode::F(n) => Key::F(n),
        _ => Key::Null,
    };
    Input {
        key: code,
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
    }
}

/// Description buffer used by the wizard and the task editor.
#[derive(Debug, Clone)]
pub struct TextEditor {
    area: TextArea<'static>,
}

impl Default for TextEditor {
    fn default() -> Self {
        Self::new()
    }
}

// Equal when the text and cursor match; styling is set per frame.
impl PartialEq for TextEditor {
    fn eq(&self, other: &Self) -> bool {
        self.area.lines() == other.area.lines() && self.area.cursor() == other.area.cursor()
    }
}

impl TextEditor {
    pub fn new() -> Self {
        Self {
            area: TextArea::default(),
        }
    }

    /// Editor seeded with `text`, cursor placed at the end.
    pub fn with_text(text: &str) -> Self {
        let mut area = TextArea::new(text.split('\n').map(str::to_string).collect());
        area.move_cursor(CursorMove::Bottom);
        area.move_cursor(CursorMove::End);
        Self { area }
    }

    pub fn text(&self) -> String {
        self.area.lines().join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.area.is_empty()
    }

    /// `(row, column)` of the cursor.
    pub fn cursor(&self) -> (usize, usize) {
        self.area.cursor()
    }

    /// Feed one key to the editor. Returns `true` if the text changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        self.area.input(to_input(key))
    }

    /// Prepare the widget for drawing inside `block`.
    pub fn widget(&mut self, block: Block<'static>, focused: bool) -> &TextArea<'static> {
        let cursor = if focused {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        self.area.set_block(block);
        self.area.set_cursor_line_style(Style::default());
        self.area.set_cursor_style(cursor);
        &self.area
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_with_text_puts_cursor_at_end() {
        let mut editor = TextEditor::with_text("first\nsecond");
        assert_eq!(editor.cursor(), (1, 6));
        editor.handle_key(&key(KeyCode::Char('!')));
        assert_eq!(editor.text(), "first\nsecond!");
    }

    #[test]
    fn test_enter_and_backspace_edit_lines() {
        let mut editor = TextEditor::new();
        assert!(editor.is_empty());
        for code in [KeyCode::Char('a'), KeyCode::Enter, KeyCode::Char('b')] {
            editor.handle_key(&key(code));
        }
        assert_eq!(editor.text(), "a\nb");
        editor.handle_key(&key(KeyCode::Backspace));
        editor.handle_key(&key(KeyCode::Backspace));
        assert_eq!(editor.text(), "a");
    }

    #[test]
    fn test_empty_text_round_trips() {
        let editor = TextEditor::with_text("");
        assert!(editor.is_empty());
        assert_eq!(editor.text(), "");
        assert_eq!(editor, TextEditor::new());
    }

    #[test]
    fn test_modifiers_carry_over() {
        let input = to_input(&KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL));
        assert_eq!(input.key, Key::Char('d'));
        assert!(input.ctrl);
        assert!(!input.alt);
    }
}
